use bson::doc;
use esshub_db::models::CustomField;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct CustomFieldDao {
    pub base: BaseDao<CustomField>,
}

impl CustomFieldDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, CustomField::COLLECTION),
        }
    }

    pub async fn upsert(&self, field: &CustomField) -> DaoResult<()> {
        let filter = doc! {
            "record_type": &field.record_type,
            "fieldname": &field.fieldname,
        };
        let update = doc! { "$set": bson::to_document(field)? };
        self.base
            .collection()
            .clone_with_type::<bson::Document>()
            .update_one(filter, update)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn fields_for(&self, record_type: &str) -> DaoResult<Vec<CustomField>> {
        self.base
            .find_many(doc! { "record_type": record_type }, None)
            .await
    }

    pub async fn delete_for(
        &self,
        record_type: &str,
        fieldnames: &[String],
    ) -> DaoResult<u64> {
        self.base
            .delete_many(doc! {
                "record_type": record_type,
                "fieldname": { "$in": fieldnames },
            })
            .await
    }
}
