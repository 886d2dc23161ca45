use crate::fixtures::test_app::TestApp;
use esshub_db::models::FieldKind;
use esshub_services::cache::SchemaCache;
use esshub_services::schema::{SchemaRegistry, seed_mapping};
use std::sync::Arc;

#[tokio::test]
async fn install_then_remove_round_trips() {
    let app = TestApp::spawn().await;
    let registry = SchemaRegistry::new(&app.db, Arc::new(SchemaCache::new()));

    registry.install(seed_mapping()).await.unwrap();

    assert!(registry.has_field("Branch", "latitude", None).await.unwrap());
    assert!(registry.has_field("Branch", "radius", None).await.unwrap());
    assert!(
        registry
            .has_field("Item", "show_in_mobile", None)
            .await
            .unwrap()
    );
    assert!(
        registry
            .has_field("Item Group", "show_in_mobile", None)
            .await
            .unwrap()
    );
    assert!(!registry.has_field("Branch", "unknown", None).await.unwrap());

    registry.remove(seed_mapping()).await.unwrap();

    assert!(!registry.has_field("Branch", "latitude", None).await.unwrap());
    assert!(
        !registry
            .has_field("Item", "show_in_mobile", None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn reinstall_is_an_upsert_not_a_duplicate() {
    let app = TestApp::spawn().await;
    let registry = SchemaRegistry::new(&app.db, Arc::new(SchemaCache::new()));

    registry.install(seed_mapping()).await.unwrap();
    let first = registry.custom_fields("Branch").await.unwrap().len();

    registry.install(seed_mapping()).await.unwrap();
    let second = registry.custom_fields("Branch").await.unwrap().len();

    assert_eq!(first, second);
}

#[tokio::test]
async fn field_kind_reads_declarations_and_defaults_to_data() {
    let app = TestApp::spawn().await;
    let registry = SchemaRegistry::new(&app.db, Arc::new(SchemaCache::new()));

    registry.install(seed_mapping()).await.unwrap();

    assert_eq!(
        registry.field_kind("Item", "show_in_mobile").await.unwrap(),
        FieldKind::Check
    );
    // Native fields carry no declaration and coerce as text
    assert_eq!(
        registry
            .field_kind("Attendance Request", "from_date")
            .await
            .unwrap(),
        FieldKind::Data
    );
}

#[tokio::test]
async fn snapshot_columns_count_as_fields() {
    let app = TestApp::spawn().await;
    let registry = SchemaRegistry::new(&app.db, Arc::new(SchemaCache::new()));

    let snapshot = bson::doc! { "status": "Open" };
    assert!(
        registry
            .has_field("Anything", "status", Some(&snapshot))
            .await
            .unwrap()
    );
    assert!(
        !registry
            .has_field("Anything", "missing", Some(&snapshot))
            .await
            .unwrap()
    );
}
