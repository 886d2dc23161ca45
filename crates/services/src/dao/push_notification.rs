use bson::{DateTime, doc, oid::ObjectId};
use esshub_db::models::{PushNotification, SendFor};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct PushNotificationDao {
    pub base: BaseDao<PushNotification>,
}

impl PushNotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, PushNotification::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        send_for: SendFor,
        title: String,
        message: String,
        notification_type: Option<String>,
        user: Option<String>,
        users: Vec<String>,
    ) -> DaoResult<PushNotification> {
        let now = DateTime::now();
        let record = PushNotification {
            id: None,
            send_for,
            title,
            message,
            notification_type,
            user,
            users,
            response: None,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&record).await?;
        self.base.find_by_id(id).await
    }

    /// The one post-creation mutation: store the serialized gateway response.
    pub async fn set_response(&self, id: ObjectId, response: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "response": response } })
            .await
    }
}
