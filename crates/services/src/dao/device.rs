use bson::doc;
use esshub_db::models::DeviceRegistration;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct DeviceDao {
    pub base: BaseDao<DeviceRegistration>,
}

impl DeviceDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, DeviceRegistration::COLLECTION),
        }
    }

    /// One registration per user: re-registering replaces the token.
    pub async fn register(&self, user: &str, token: Option<&str>) -> DaoResult<()> {
        let now = bson::DateTime::now();
        self.base
            .collection()
            .update_one(
                doc! { "user": user },
                doc! {
                    "$set": { "token": token },
                    "$setOnInsert": { "user": user, "created_at": now },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn token_for_user(&self, user: &str) -> DaoResult<Option<String>> {
        Ok(self
            .base
            .find_one(doc! { "user": user, "token": { "$ne": null } })
            .await?
            .and_then(|d| d.token))
    }

    /// Registrations with a token set, for any of the given user emails.
    /// Users without a device are silently absent from the result.
    pub async fn registrations_for_users(
        &self,
        users: &[String],
    ) -> DaoResult<Vec<DeviceRegistration>> {
        self.base
            .find_many(
                doc! { "user": { "$in": users }, "token": { "$ne": null } },
                None,
            )
            .await
    }

    pub async fn all_tokens(&self) -> DaoResult<Vec<String>> {
        let values = self
            .base
            .find_values(doc! { "token": { "$ne": null } }, "token")
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}
