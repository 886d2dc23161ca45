use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Mobile device registration: user email to push token. Owned by the
/// mobile app's login flow; this subsystem only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegistration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: String,
    pub token: Option<String>,
    pub created_at: DateTime,
}

impl DeviceRegistration {
    pub const COLLECTION: &'static str = "employee_devices";
}
