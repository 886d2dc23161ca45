use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Login email of the user this employee record belongs to.
    pub user_id: String,
    pub employee_name: String,
    pub department: Option<String>,
    pub company: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Employee {
    pub const COLLECTION: &'static str = "employees";
}
