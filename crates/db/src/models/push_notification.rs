use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Manually authored push send. Created once; the gateway response is
/// written back exactly once after the send completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushNotification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub send_for: SendFor,
    pub title: String,
    pub message: String,
    pub notification_type: Option<String>,
    /// Target for Single User sends.
    pub user: Option<String>,
    /// Targets for Multiple User sends.
    #[serde(default)]
    pub users: Vec<String>,
    /// Serialized gateway response, populated after the send.
    pub response: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendFor {
    #[serde(rename = "Single User")]
    SingleUser,
    #[serde(rename = "Multiple User")]
    MultipleUser,
    #[serde(rename = "All User")]
    AllUser,
}

impl PushNotification {
    pub const COLLECTION: &'static str = "push_notifications";
}
