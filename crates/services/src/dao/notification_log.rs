use bson::{DateTime, doc};
use esshub_db::models::NotificationLog;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct NotificationLogDao {
    pub base: BaseDao<NotificationLog>,
}

impl NotificationLogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, NotificationLog::COLLECTION),
        }
    }

    /// One log entry per recipient per firing. Entries are never mutated.
    pub async fn create(
        &self,
        rule_name: &str,
        document_type: &str,
        subject: &str,
        message: &str,
        recipient: &str,
        token: &str,
    ) -> DaoResult<NotificationLog> {
        let entry = NotificationLog {
            id: None,
            rule_name: rule_name.to_string(),
            document_type: document_type.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            recipient: recipient.to_string(),
            token: token.to_string(),
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&entry).await?;
        self.base.find_by_id(id).await
    }

    pub async fn count_for_rule(&self, rule_name: &str) -> DaoResult<u64> {
        self.base.count(doc! { "rule_name": rule_name }).await
    }
}
