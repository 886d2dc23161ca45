use bson::{doc, oid::ObjectId};
use esshub_db::models::NotificationRule;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct NotificationRuleDao {
    pub base: BaseDao<NotificationRule>,
}

impl NotificationRuleDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, NotificationRule::COLLECTION),
        }
    }

    /// Enabled rules for a document type, all trigger events. Cached per
    /// document type by the engine.
    pub async fn find_enabled_for_type(
        &self,
        document_type: &str,
    ) -> DaoResult<Vec<NotificationRule>> {
        self.base
            .find_many(
                doc! { "document_type": document_type, "enabled": true },
                None,
            )
            .await
    }

    pub async fn find_time_based_enabled(&self) -> DaoResult<Vec<NotificationRule>> {
        self.base
            .find_many(
                doc! {
                    "event": { "$in": ["Days Before", "Days After"] },
                    "enabled": true,
                },
                None,
            )
            .await
    }

    /// Self-disable for schema drift; bypasses validation deliberately.
    pub async fn disable(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "enabled": false } })
            .await
    }
}
