use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Immutable audit record of one attempted delivery. Created once per
/// recipient per firing; creation triggers the outbound push as a side
/// effect and is never rolled back if that push fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub rule_name: String,
    pub document_type: String,
    pub subject: String,
    pub message: String,
    pub recipient: String,
    pub token: String,
    pub created_at: DateTime,
}

impl NotificationLog {
    pub const COLLECTION: &'static str = "notification_logs";
}
