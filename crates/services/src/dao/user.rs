use bson::{DateTime, doc};
use esshub_db::models::User;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        full_name: String,
        password_hash: Option<String>,
        roles: Vec<String>,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email,
            full_name,
            password_hash,
            roles,
            enabled: true,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<User>> {
        self.base.find_one(doc! { "email": email }).await
    }

    /// Emails of every enabled user holding `role`. Feeds role-based
    /// recipient resolution.
    pub async fn emails_with_role(&self, role: &str) -> DaoResult<Vec<String>> {
        let values = self
            .base
            .find_values(doc! { "roles": role, "enabled": true }, "email")
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}
