use bson::{Bson, Document, doc};
use chrono::NaiveDate;
use mongodb::Database;

use crate::dao::base::DaoResult;

/// Untyped access to business records by record-type name. The rule engine
/// works over arbitrary record types, so it reads raw documents rather
/// than going through the typed DAOs.
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Collection name for a record type, e.g. "Attendance Request" ->
    /// "attendance_requests".
    pub fn collection_name(record_type: &str) -> String {
        match record_type {
            "Branch" => "branches".to_string(),
            "Employee" => "employees".to_string(),
            "User" => "users".to_string(),
            other => {
                let slug = other.to_lowercase().replace(' ', "_");
                if slug.ends_with('s') {
                    slug
                } else {
                    format!("{slug}s")
                }
            }
        }
    }

    /// Records whose `field` falls on `date` (dates are ISO strings;
    /// datetime values carry a time suffix, so the upper bound includes
    /// the whole day).
    pub async fn find_on_date(
        &self,
        record_type: &str,
        field: &str,
        date: NaiveDate,
    ) -> DaoResult<Vec<Document>> {
        let day = date.format("%Y-%m-%d").to_string();
        let upper = format!("{day} 23:59:59.999999");

        let mut cursor = self
            .db
            .collection::<Document>(&Self::collection_name(record_type))
            .find(doc! { field: { "$gte": day, "$lte": upper } })
            .await?;

        let mut docs = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            docs.push(doc);
        }
        Ok(docs)
    }
}

/// BSON document to JSON for condition and template contexts. ObjectIds
/// become hex strings and datetimes RFC 3339, so expressions compare
/// against plain values.
pub fn bson_to_json(doc: &Document) -> serde_json::Value {
    fn convert(value: &Bson) -> serde_json::Value {
        match value {
            Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
            Bson::DateTime(dt) => serde_json::Value::String(
                dt.try_to_rfc3339_string().unwrap_or_default(),
            ),
            Bson::Document(d) => serde_json::Value::Object(
                d.iter().map(|(k, v)| (k.clone(), convert(v))).collect(),
            ),
            Bson::Array(items) => {
                serde_json::Value::Array(items.iter().map(convert).collect())
            }
            other => other.clone().into_relaxed_extjson(),
        }
    }

    serde_json::Value::Object(
        doc.iter().map(|(k, v)| (k.clone(), convert(v))).collect(),
    )
}
