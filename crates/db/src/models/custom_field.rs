use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// An additional attribute installed on an existing record type,
/// positioned immediately after its anchor field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub record_type: String,
    pub fieldname: String,
    pub label: String,
    pub fieldtype: FieldKind,
    pub insert_after: String,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Child record type for `Table` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    pub created_at: DateTime,
}

impl CustomField {
    pub const COLLECTION: &'static str = "custom_fields";
}

/// Declared field types, matching the record store's type vocabulary.
/// The declared type drives value coercion in the rule engine's
/// value-change comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Data,
    #[serde(rename = "Small Text")]
    SmallText,
    Text,
    #[serde(rename = "HTML")]
    Html,
    Check,
    Int,
    Float,
    Currency,
    Date,
    Datetime,
    Select,
    Link,
    Attach,
    Table,
    #[serde(rename = "Section Break")]
    SectionBreak,
    #[serde(rename = "Column Break")]
    ColumnBreak,
}
