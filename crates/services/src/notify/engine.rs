use bson::{Bson, Document, doc, oid::ObjectId};
use chrono::{Duration, NaiveDate};
use esshub_config::NotificationSettings;
use esshub_db::models::{FieldKind, NotificationRule, TriggerEvent};
use mongodb::Database;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::RuleCache;
use crate::condition::{self, ConditionError};
use crate::dao::base::DaoError;
use crate::dao::{DeviceDao, NotificationLogDao, NotificationRuleDao, UserDao};
use crate::records::{RecordStore, bson_to_json};
use crate::schema::SchemaRegistry;
use crate::template::{TemplateError, TemplateService};

use super::fcm::FcmClient;
use super::recipients;
use super::webhook::WebhookRelay;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("The Condition '{0}' is invalid")]
    InvalidCondition(String),
    #[error("Error in Notification '{rule}'. Please fix your template: {message}")]
    Template { rule: String, message: String },
    #[error("Validation: {0}")]
    Validation(String),
    #[error(transparent)]
    Dao(#[from] DaoError),
}

/// Document lifecycle events as reported by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    BeforeSave,
    AfterSave,
    OnSubmit,
    BeforeCancel,
    AfterCancel,
    OnChange,
}

/// Pure mapping from lifecycle event to rule trigger kind. OnChange only
/// counts as Value Change for records that already existed before the
/// triggering save.
pub fn trigger_for(event: LifecycleEvent, is_new: bool) -> Option<TriggerEvent> {
    match event {
        LifecycleEvent::BeforeSave => Some(TriggerEvent::New),
        LifecycleEvent::AfterSave => Some(TriggerEvent::Save),
        LifecycleEvent::OnSubmit => Some(TriggerEvent::Submit),
        LifecycleEvent::BeforeCancel | LifecycleEvent::AfterCancel => {
            Some(TriggerEvent::Cancel)
        }
        LifecycleEvent::OnChange => {
            if is_new {
                None
            } else {
                Some(TriggerEvent::ValueChange)
            }
        }
    }
}

/// Normalized value for before/after comparison, coerced by the field's
/// declared type so "1" and 1 on a Check field compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Int(i64),
    Float(f64),
    Text(String),
    Date(Option<NaiveDate>),
}

pub fn coerce(kind: FieldKind, value: Option<&Bson>) -> Coerced {
    match kind {
        FieldKind::Check | FieldKind::Int => Coerced::Int(match value {
            Some(Bson::Boolean(b)) => *b as i64,
            Some(Bson::Int32(n)) => *n as i64,
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Double(n)) => *n as i64,
            Some(Bson::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }),
        FieldKind::Float | FieldKind::Currency => Coerced::Float(match value {
            Some(Bson::Double(n)) => *n,
            Some(Bson::Int32(n)) => *n as f64,
            Some(Bson::Int64(n)) => *n as f64,
            Some(Bson::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }),
        FieldKind::Date | FieldKind::Datetime => Coerced::Date(match value {
            Some(Bson::String(s)) => condition::parse_date(s),
            Some(Bson::DateTime(dt)) => condition::parse_date(
                &dt.try_to_rfc3339_string().unwrap_or_default(),
            ),
            _ => None,
        }),
        _ => Coerced::Text(match value {
            Some(Bson::String(s)) => s.clone(),
            Some(Bson::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }),
    }
}

pub struct NotificationEngine {
    settings: NotificationSettings,
    rules: NotificationRuleDao,
    logs: Arc<NotificationLogDao>,
    users: UserDao,
    devices: DeviceDao,
    records: RecordStore,
    schema: Arc<SchemaRegistry>,
    templates: TemplateService,
    cache: Arc<RuleCache>,
    fcm: Arc<FcmClient>,
    webhook: Arc<WebhookRelay>,
}

impl NotificationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: &Database,
        settings: &NotificationSettings,
        schema: Arc<SchemaRegistry>,
        cache: Arc<RuleCache>,
        fcm: Arc<FcmClient>,
        webhook: Arc<WebhookRelay>,
    ) -> Self {
        Self {
            settings: settings.clone(),
            rules: NotificationRuleDao::new(db),
            logs: Arc::new(NotificationLogDao::new(db)),
            users: UserDao::new(db),
            devices: DeviceDao::new(db),
            records: RecordStore::new(db),
            schema,
            templates: TemplateService::new(),
            cache,
            fcm,
            webhook,
        }
    }

    // ---- Rule administration ---------------------------------------------

    /// Save-time validation. Any failure here blocks the save.
    pub fn validate_rule(&self, rule: &NotificationRule) -> Result<(), NotifyError> {
        self.templates
            .validate(&rule.subject)
            .and_then(|_| self.templates.validate(&rule.message))
            .map_err(|e| NotifyError::Template {
                rule: rule.name.clone(),
                message: e.to_string(),
            })?;

        if rule.event.is_time_based() && rule.date_field.is_none() {
            return Err(NotifyError::Validation(
                "Please specify which date field must be checked".to_string(),
            ));
        }

        if rule.event == TriggerEvent::ValueChange && rule.value_field.is_none() {
            return Err(NotifyError::Validation(
                "Please specify which value field must be checked".to_string(),
            ));
        }

        if let Some(ref cond) = rule.condition {
            // Run against a blank snapshot to catch syntax errors early
            if let Err(ConditionError::Lex { .. } | ConditionError::Parse(_)) =
                condition::evaluate(cond, &serde_json::json!({}))
            {
                return Err(NotifyError::InvalidCondition(cond.clone()));
            }
        }

        Ok(())
    }

    pub async fn save_rule(
        &self,
        mut rule: NotificationRule,
    ) -> Result<NotificationRule, NotifyError> {
        if rule.name.is_empty() {
            rule.name = rule.subject.clone();
        }
        self.validate_rule(&rule)?;

        let saved = match rule.id {
            Some(id) => {
                let mut update = bson::to_document(&rule).map_err(DaoError::from)?;
                update.remove("_id");
                // The creation stamp survives edits
                update.remove("created_at");
                self.rules
                    .base
                    .update_by_id(id, doc! { "$set": update })
                    .await?;
                self.rules.base.find_by_id(id).await?
            }
            None => {
                let id = self.rules.base.insert_one(&rule).await?;
                self.rules.base.find_by_id(id).await?
            }
        };

        self.cache.invalidate(&saved.document_type);
        Ok(saved)
    }

    pub async fn delete_rule(&self, id: ObjectId) -> Result<(), NotifyError> {
        let rule = self.rules.base.find_by_id(id).await?;
        self.rules.base.delete_by_id(id).await?;
        self.cache.invalidate(&rule.document_type);
        Ok(())
    }

    pub async fn find_rule(&self, id: ObjectId) -> Result<NotificationRule, NotifyError> {
        Ok(self.rules.base.find_by_id(id).await?)
    }

    // ---- Lifecycle firing ------------------------------------------------

    /// Entry point for document lifecycle events. Template errors are
    /// blocking and attributed to the offending rule; every other per-rule
    /// failure is logged and the remaining rules still run.
    pub async fn handle_event(
        &self,
        document_type: &str,
        doc: &Document,
        before: Option<&Document>,
        event: LifecycleEvent,
        is_new: bool,
    ) -> Result<(), NotifyError> {
        if !self.settings.enabled {
            return Ok(());
        }
        let Some(trigger) = trigger_for(event, is_new) else {
            return Ok(());
        };

        let rules = self.rules_for(document_type).await?;
        for rule in rules.iter().filter(|r| r.event == trigger) {
            match self.evaluate_rule(rule, doc, before, is_new).await {
                Ok(fired) => {
                    if fired {
                        info!(rule = %rule.name, document_type, "Notification fired");
                    }
                }
                Err(e @ NotifyError::Template { .. }) => return Err(e),
                Err(e) => {
                    error!(rule = %rule.name, %e, "Notification evaluation failed");
                }
            }
        }
        Ok(())
    }

    async fn rules_for(
        &self,
        document_type: &str,
    ) -> Result<Arc<Vec<NotificationRule>>, NotifyError> {
        if let Some(rules) = self.cache.get(document_type) {
            return Ok(rules);
        }
        let loaded = self.rules.find_enabled_for_type(document_type).await?;
        Ok(self.cache.put(document_type, loaded))
    }

    /// One firing attempt: condition gate, value-change check, recipient
    /// resolution, render, dispatch. Returns whether anything was sent.
    async fn evaluate_rule(
        &self,
        rule: &NotificationRule,
        doc: &Document,
        before: Option<&Document>,
        is_new: bool,
    ) -> Result<bool, NotifyError> {
        let doc_json = bson_to_json(doc);

        if let Some(ref cond) = rule.condition {
            match condition::evaluate(cond, &doc_json) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(e) => {
                    warn!(rule = %rule.name, %e, "Condition failed at firing time");
                    return Ok(false);
                }
            }
        }

        if rule.event == TriggerEvent::ValueChange && !is_new {
            let Some(field) = rule.value_field.as_deref() else {
                return Ok(false);
            };

            if !self
                .schema
                .has_field(&rule.document_type, field, Some(doc))
                .await?
            {
                // Schema drift: the watched field no longer exists.
                // Disable the rule rather than failing the transaction.
                if let Some(id) = rule.id {
                    self.rules.disable(id).await?;
                    self.cache.invalidate(&rule.document_type);
                }
                error!(
                    rule = %rule.name,
                    field,
                    "Notification disabled due to missing field"
                );
                return Ok(false);
            }

            let kind = self.schema.field_kind(&rule.document_type, field).await?;
            let current = coerce(kind, doc.get(field));
            let previous = coerce(kind, before.and_then(|b| b.get(field)));
            if current == previous {
                return Ok(false);
            }
        }

        self.send(rule, doc, &doc_json).await
    }

    async fn send(
        &self,
        rule: &NotificationRule,
        doc: &Document,
        doc_json: &serde_json::Value,
    ) -> Result<bool, NotifyError> {
        let recipients =
            recipients::resolve(rule, doc, doc_json, &self.users, &self.devices).await?;
        if recipients.is_empty() {
            return Ok(false);
        }

        let subject = self
            .templates
            .render(&rule.subject, doc_json)
            .map_err(|e| self.template_error(rule, e))?;
        let message = self
            .templates
            .render(&rule.message, doc_json)
            .map_err(|e| self.template_error(rule, e))?;

        for recipient in &recipients {
            let entry = self
                .logs
                .create(
                    &rule.name,
                    &rule.document_type,
                    &subject,
                    &message,
                    &recipient.user,
                    &recipient.token,
                )
                .await?;

            // Fire-and-forget: delivery never blocks or fails the
            // triggering transaction.
            let fcm = Arc::clone(&self.fcm);
            let webhook = Arc::clone(&self.webhook);
            tokio::spawn(async move {
                fcm.send_single(
                    &entry.token,
                    &entry.subject,
                    &entry.message,
                    Some(&entry.recipient),
                    Some("info"),
                )
                .await;
                webhook.relay(&entry).await;
            });
        }
        Ok(true)
    }

    fn template_error(&self, rule: &NotificationRule, e: TemplateError) -> NotifyError {
        NotifyError::Template {
            rule: rule.name.clone(),
            message: e.to_string(),
        }
    }

    // ---- Daily sweep -----------------------------------------------------

    /// Records whose reference date, offset by the rule's day count, falls
    /// on today. Days Before looks forward, Days After back.
    pub async fn documents_for_today(
        &self,
        rule: &NotificationRule,
    ) -> Result<Vec<Document>, NotifyError> {
        let Some(ref date_field) = rule.date_field else {
            return Ok(Vec::new());
        };

        let today = chrono::Local::now().date_naive();
        let target = sweep_target_date(today, rule.event, rule.days_in_advance);

        let candidates = self
            .records
            .find_on_date(&rule.document_type, date_field, target)
            .await?;

        let mut matched = Vec::new();
        for doc in candidates {
            if let Some(ref cond) = rule.condition {
                let doc_json = bson_to_json(&doc);
                match condition::evaluate(cond, &doc_json) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(rule = %rule.name, %e, "Condition failed during sweep");
                        continue;
                    }
                }
            }
            matched.push(doc);
        }
        Ok(matched)
    }

    /// The scheduled pass over all time-based rules. Each matched record
    /// is processed and committed independently: one failure is logged
    /// and the sweep moves on.
    pub async fn run_daily_sweep(&self) -> Result<(), NotifyError> {
        if !self.settings.enabled {
            return Ok(());
        }

        let rules = self.rules.find_time_based_enabled().await?;
        info!(count = rules.len(), "Running daily notification sweep");

        for rule in &rules {
            let docs = match self.documents_for_today(rule).await {
                Ok(docs) => docs,
                Err(e) => {
                    error!(rule = %rule.name, %e, "Sweep query failed");
                    continue;
                }
            };

            for doc in docs {
                if let Err(e) = self.evaluate_rule(rule, &doc, None, false).await {
                    error!(rule = %rule.name, %e, "Sweep evaluation failed");
                }
            }
        }
        Ok(())
    }
}

/// Target reference date for a sweep run on `today`.
pub fn sweep_target_date(today: NaiveDate, event: TriggerEvent, days: i64) -> NaiveDate {
    match event {
        TriggerEvent::DaysAfter => today - Duration::days(days),
        _ => today + Duration::days(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_mapping_matches_trigger_kinds() {
        assert_eq!(
            trigger_for(LifecycleEvent::BeforeSave, true),
            Some(TriggerEvent::New)
        );
        assert_eq!(
            trigger_for(LifecycleEvent::AfterSave, false),
            Some(TriggerEvent::Save)
        );
        assert_eq!(
            trigger_for(LifecycleEvent::OnSubmit, false),
            Some(TriggerEvent::Submit)
        );
        assert_eq!(
            trigger_for(LifecycleEvent::BeforeCancel, false),
            Some(TriggerEvent::Cancel)
        );
        assert_eq!(
            trigger_for(LifecycleEvent::AfterCancel, false),
            Some(TriggerEvent::Cancel)
        );
    }

    #[test]
    fn value_change_never_applies_to_inserts() {
        assert_eq!(trigger_for(LifecycleEvent::OnChange, true), None);
        assert_eq!(
            trigger_for(LifecycleEvent::OnChange, false),
            Some(TriggerEvent::ValueChange)
        );
    }

    #[test]
    fn check_fields_coerce_bool_string_and_int_alike() {
        let as_bool = coerce(FieldKind::Check, Some(&Bson::Boolean(true)));
        let as_int = coerce(FieldKind::Check, Some(&Bson::Int32(1)));
        let as_text = coerce(FieldKind::Check, Some(&Bson::String("1".to_string())));
        assert_eq!(as_bool, as_int);
        assert_eq!(as_int, as_text);
        assert_ne!(as_bool, coerce(FieldKind::Check, None));
    }

    #[test]
    fn missing_text_value_coerces_to_empty_string() {
        assert_eq!(
            coerce(FieldKind::Data, None),
            Coerced::Text(String::new())
        );
        assert_eq!(
            coerce(FieldKind::Data, Some(&Bson::Null)),
            Coerced::Text(String::new())
        );
    }

    #[test]
    fn date_fields_compare_by_day() {
        let a = coerce(
            FieldKind::Date,
            Some(&Bson::String("2024-03-01".to_string())),
        );
        let b = coerce(
            FieldKind::Date,
            Some(&Bson::String("2024-03-01 09:30:00".to_string())),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn sweep_dates_offset_in_opposite_directions() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(
            sweep_target_date(today, TriggerEvent::DaysBefore, 7),
            NaiveDate::from_ymd_opt(2024, 6, 22).unwrap()
        );
        assert_eq!(
            sweep_target_date(today, TriggerEvent::DaysAfter, 7),
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        );
    }
}
