use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Administrator-configured push notification rule. One rule watches one
/// record type for one trigger event; firing renders the subject/message
/// templates and fans the result out to the resolved recipients' devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRule {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Human identifier; defaults to the subject on first save.
    pub name: String,
    pub document_type: String,
    pub event: TriggerEvent,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub message_format: MessageFormat,
    /// Optional boolean expression gating the firing.
    pub condition: Option<String>,
    /// Reference date field for Days Before / Days After rules.
    pub date_field: Option<String>,
    #[serde(default)]
    pub days_in_advance: i64,
    /// Watched field for Value Change rules.
    pub value_field: Option<String>,
    #[serde(default)]
    pub recipients: Vec<RecipientSpec>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_enabled() -> bool {
    true
}

impl NotificationRule {
    pub const COLLECTION: &'static str = "notification_rules";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    New,
    Save,
    Submit,
    Cancel,
    #[serde(rename = "Value Change")]
    ValueChange,
    #[serde(rename = "Days Before")]
    DaysBefore,
    #[serde(rename = "Days After")]
    DaysAfter,
}

impl TriggerEvent {
    pub fn is_time_based(self) -> bool {
        matches!(self, TriggerEvent::DaysBefore | TriggerEvent::DaysAfter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageFormat {
    #[serde(rename = "HTML")]
    Html,
    #[default]
    Markdown,
    #[serde(rename = "Plain Text")]
    PlainText,
}

/// One way to compute recipients for a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientSpec {
    /// Optional expression gating this specification only.
    pub condition: Option<String>,
    #[serde(flatten)]
    pub source: RecipientSource,
}

/// Where the recipient addresses come from. Each variant carries only the
/// data it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecipientSource {
    /// A field on the triggering record holding one address, or several
    /// joined by commas or newlines.
    DirectField { field: String },
    /// A column read from every row of a child table on the record.
    ChildTableField { field: String, column: String },
    /// Every enabled user holding the role.
    Role { role: String },
}
