use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Platform login. Employees are linked to a user by email; roles drive
/// both admin access and role-based notification recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_enabled() -> bool {
    true
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
