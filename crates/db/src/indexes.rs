use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Employees
    create_indexes(
        db,
        "employees",
        vec![index_unique(bson::doc! { "user_id": 1 })],
    )
    .await?;

    // Device registrations
    create_indexes(
        db,
        "employee_devices",
        vec![index(bson::doc! { "user": 1 })],
    )
    .await?;

    // Custom fields
    create_indexes(
        db,
        "custom_fields",
        vec![index_unique(bson::doc! { "record_type": 1, "fieldname": 1 })],
    )
    .await?;

    // Notification rules
    create_indexes(
        db,
        "notification_rules",
        vec![
            index_unique(bson::doc! { "name": 1 }),
            index(bson::doc! { "document_type": 1, "event": 1, "enabled": 1 }),
        ],
    )
    .await?;

    // Notification logs
    create_indexes(
        db,
        "notification_logs",
        vec![index(bson::doc! { "rule_name": 1, "created_at": -1 })],
    )
    .await?;

    // Attendance requests
    create_indexes(
        db,
        "attendance_requests",
        vec![index(bson::doc! { "employee": 1, "from_date": 1 })],
    )
    .await?;

    // Shift types
    create_indexes(
        db,
        "shift_types",
        vec![index_unique(bson::doc! { "name": 1 })],
    )
    .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}
