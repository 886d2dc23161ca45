use bson::DateTime;
use esshub_db::models::{CustomField, FieldKind};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::cache::SchemaCache;
use crate::dao::CustomFieldDao;
use crate::dao::base::DaoResult;

/// A field definition as declared in a mapping, before it is attached to
/// a record type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub fieldname: String,
    pub label: String,
    pub fieldtype: FieldKind,
    pub insert_after: String,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

/// A mapping key or value that may be given singly or as a list. Both
/// forms normalize to the plural one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Record-type names to the fields installed on them.
pub type FieldMapping = Vec<(OneOrMany<String>, OneOrMany<FieldDef>)>;

/// Expands one-or-many keys and field lists into flat
/// (record type, fields) pairs.
pub fn normalize(mapping: FieldMapping) -> Vec<(String, Vec<FieldDef>)> {
    let mut out = Vec::new();
    for (types, fields) in mapping {
        let fields = fields.into_vec();
        for record_type in types.into_vec() {
            out.push((record_type, fields.clone()));
        }
    }
    out
}

/// The fields this module ships with: branch geo columns, check-in
/// metadata, mobile visibility flags, and the employee-branch child table.
pub fn seed_mapping() -> FieldMapping {
    fn field(
        fieldname: &str,
        label: &str,
        fieldtype: FieldKind,
        insert_after: &str,
    ) -> FieldDef {
        FieldDef {
            fieldname: fieldname.to_string(),
            label: label.to_string(),
            fieldtype,
            insert_after: insert_after.to_string(),
            translatable: false,
            read_only: false,
            options: None,
        }
    }

    vec![
        (
            OneOrMany::One("Branch".to_string()),
            OneOrMany::Many(vec![
                FieldDef {
                    translatable: true,
                    ..field("latitude", "Latitude", FieldKind::Data, "branch")
                },
                FieldDef {
                    translatable: true,
                    ..field("longitude", "Longitude", FieldKind::Data, "latitude")
                },
                FieldDef {
                    translatable: true,
                    ..field("radius", "Radius", FieldKind::Data, "longitude")
                },
                field("address_search", "Address Search", FieldKind::Html, "radius"),
                field("address", "Address", FieldKind::Data, "address_search"),
                field(
                    "column_break_branch",
                    "",
                    FieldKind::ColumnBreak,
                    "address",
                ),
            ]),
        ),
        (
            OneOrMany::One("Employee Checkin".to_string()),
            OneOrMany::Many(vec![
                FieldDef {
                    translatable: true,
                    read_only: true,
                    ..field("location", "Location", FieldKind::SmallText, "shift_actual_end")
                },
                FieldDef {
                    translatable: true,
                    read_only: true,
                    ..field(
                        "odometer_reading",
                        "Odometer reading",
                        FieldKind::Data,
                        "log_type",
                    )
                },
                field(
                    "attendance_image",
                    "Attendance Image",
                    FieldKind::Attach,
                    "location",
                ),
            ]),
        ),
        // Same flag on both catalog types
        (
            OneOrMany::Many(vec!["Item Group".to_string(), "Item".to_string()]),
            OneOrMany::One(field(
                "show_in_mobile",
                "Show in Mobile",
                FieldKind::Check,
                "disabled",
            )),
        ),
        (
            OneOrMany::One("Employee".to_string()),
            OneOrMany::Many(vec![
                field(
                    "custom_employee_branches_tab",
                    "Employee Branches",
                    FieldKind::SectionBreak,
                    "grade",
                ),
                FieldDef {
                    options: Some("Employee Branch Details".to_string()),
                    ..field(
                        "custom_employee_branch_table",
                        "Employee Branches",
                        FieldKind::Table,
                        "custom_employee_branches_tab",
                    )
                },
            ]),
        ),
    ]
}

pub struct SchemaRegistry {
    dao: CustomFieldDao,
    cache: Arc<SchemaCache>,
}

impl SchemaRegistry {
    pub fn new(db: &Database, cache: Arc<SchemaCache>) -> Self {
        Self {
            dao: CustomFieldDao::new(db),
            cache,
        }
    }

    /// Installs every field in the mapping, keyed by
    /// (record type, fieldname). Re-running is an upsert, not a duplicate.
    pub async fn install(&self, mapping: FieldMapping) -> DaoResult<()> {
        for (record_type, fields) in normalize(mapping) {
            for def in &fields {
                let field = CustomField {
                    id: None,
                    record_type: record_type.clone(),
                    fieldname: def.fieldname.clone(),
                    label: def.label.clone(),
                    fieldtype: def.fieldtype,
                    insert_after: def.insert_after.clone(),
                    translatable: def.translatable,
                    read_only: def.read_only,
                    options: def.options.clone(),
                    created_at: DateTime::now(),
                };
                self.dao.upsert(&field).await?;
            }
            self.cache.invalidate(&record_type);
            info!(record_type, count = fields.len(), "Installed custom fields");
        }
        Ok(())
    }

    /// Deletes the mapping's fields by (record type, fieldname) and
    /// invalidates the schema cache for each affected record type.
    pub async fn remove(&self, mapping: FieldMapping) -> DaoResult<()> {
        for (record_type, fields) in normalize(mapping) {
            let names: Vec<String> =
                fields.iter().map(|f| f.fieldname.clone()).collect();
            let deleted = self.dao.delete_for(&record_type, &names).await?;
            self.cache.invalidate(&record_type);
            info!(record_type, deleted, "Removed custom fields");
        }
        Ok(())
    }

    pub async fn custom_fields(&self, record_type: &str) -> DaoResult<Vec<CustomField>> {
        self.dao.fields_for(record_type).await
    }

    /// Column-existence check: a field is known when it is installed as a
    /// custom field for the record type or appears on the authoritative
    /// snapshot of the record itself.
    pub async fn has_field(
        &self,
        record_type: &str,
        field: &str,
        snapshot: Option<&bson::Document>,
    ) -> DaoResult<bool> {
        if let Some(doc) = snapshot {
            if doc.contains_key(field) {
                return Ok(true);
            }
        }

        let fields = match self.cache.get(record_type) {
            Some(fields) => fields,
            None => {
                let loaded: HashSet<String> = self
                    .dao
                    .fields_for(record_type)
                    .await?
                    .into_iter()
                    .map(|f| f.fieldname)
                    .collect();
                self.cache.put(record_type, loaded)
            }
        };
        Ok(fields.contains(field))
    }

    /// Declared type of a field, for value coercion. Only installed custom
    /// fields carry a declaration; native fields fall back to Data and
    /// compare as text, which is exact only while both snapshots store the
    /// field in the same string form.
    pub async fn field_kind(&self, record_type: &str, field: &str) -> DaoResult<FieldKind> {
        let kind = self
            .dao
            .fields_for(record_type)
            .await?
            .into_iter()
            .find(|f| f.fieldname == field)
            .map(|f| f.fieldtype)
            .unwrap_or(FieldKind::Data);
        Ok(kind)
    }
}
