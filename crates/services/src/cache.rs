use dashmap::DashMap;
use esshub_db::models::NotificationRule;
use std::collections::HashSet;
use std::sync::Arc;

/// Rule index keyed by document type. Invalidated on rule save/delete and
/// rebuilt from MongoDB on the next read; never repopulated in place.
#[derive(Default)]
pub struct RuleCache {
    map: DashMap<String, Arc<Vec<NotificationRule>>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_type: &str) -> Option<Arc<Vec<NotificationRule>>> {
        self.map.get(document_type).map(|e| Arc::clone(&e))
    }

    pub fn put(&self, document_type: &str, rules: Vec<NotificationRule>) -> Arc<Vec<NotificationRule>> {
        let rules = Arc::new(rules);
        self.map.insert(document_type.to_string(), Arc::clone(&rules));
        rules
    }

    pub fn invalidate(&self, document_type: &str) {
        self.map.remove(document_type);
    }
}

/// Custom-field names per record type, for column-existence checks.
/// Same invalidation discipline as the rule index.
#[derive(Default)]
pub struct SchemaCache {
    map: DashMap<String, Arc<HashSet<String>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, record_type: &str) -> Option<Arc<HashSet<String>>> {
        self.map.get(record_type).map(|e| Arc::clone(&e))
    }

    pub fn put(&self, record_type: &str, fields: HashSet<String>) -> Arc<HashSet<String>> {
        let fields = Arc::new(fields);
        self.map.insert(record_type.to_string(), Arc::clone(&fields));
        fields
    }

    pub fn invalidate(&self, record_type: &str) {
        self.map.remove(record_type);
    }
}
