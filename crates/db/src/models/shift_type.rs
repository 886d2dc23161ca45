use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftType {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_at: DateTime,
}

impl ShiftType {
    pub const COLLECTION: &'static str = "shift_types";
}
