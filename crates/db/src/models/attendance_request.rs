use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Employee request to be marked present for a date range. Owned by the
/// requesting employee. Dates are ISO `YYYY-MM-DD` strings, matching the
/// record store's date column representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub employee: ObjectId,
    pub employee_name: String,
    pub department: Option<String>,
    pub company: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub half_day: bool,
    pub half_day_date: Option<String>,
    #[serde(default)]
    pub include_holidays: bool,
    pub shift: Option<String>,
    pub reason: String,
    pub explanation: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl AttendanceRequest {
    pub const COLLECTION: &'static str = "attendance_requests";
}
