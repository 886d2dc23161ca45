use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::{DateTime, oid::ObjectId};
use esshub_db::models::{MessageFormat, NotificationRule, RecipientSpec, TriggerEvent};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

const ADMIN_ROLES: [&str; 2] = ["System Manager", "HR Manager"];

#[derive(Debug, Deserialize)]
pub struct RuleBody {
    #[serde(default)]
    pub name: String,
    pub document_type: String,
    pub event: TriggerEvent,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub message_format: MessageFormat,
    pub condition: Option<String>,
    pub date_field: Option<String>,
    #[serde(default)]
    pub days_in_advance: i64,
    pub value_field: Option<String>,
    #[serde(default)]
    pub recipients: Vec<RecipientSpec>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: String,
    pub name: String,
    pub document_type: String,
    pub event: TriggerEvent,
    pub enabled: bool,
    pub subject: String,
    pub message: String,
    pub message_format: MessageFormat,
    pub condition: Option<String>,
    pub date_field: Option<String>,
    pub days_in_advance: i64,
    pub value_field: Option<String>,
    pub recipients: Vec<RecipientSpec>,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RuleBody>,
) -> Result<(StatusCode, Json<RuleResponse>), ApiError> {
    require_admin(&auth)?;

    let rule = state.engine.save_rule(from_body(body, None)).await?;
    Ok((StatusCode::CREATED, Json(to_response(rule)?)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<String>,
    Json(body): Json<RuleBody>,
) -> Result<Json<RuleResponse>, ApiError> {
    require_admin(&auth)?;
    let id = parse_id(&rule_id)?;

    // Existence check keeps update from turning into an insert
    state.engine.find_rule(id).await?;
    let rule = state.engine.save_rule(from_body(body, Some(id))).await?;
    Ok(Json(to_response(rule)?))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<String>,
) -> Result<Json<RuleResponse>, ApiError> {
    require_admin(&auth)?;
    let rule = state.engine.find_rule(parse_id(&rule_id)?).await?;
    Ok(Json(to_response(rule)?))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&auth)?;
    state.engine.delete_rule(parse_id(&rule_id)?).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Preview of the records a time-based rule would fire for today.
pub async fn documents_for_today(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    require_admin(&auth)?;

    let rule = state.engine.find_rule(parse_id(&rule_id)?).await?;
    let documents = state.engine.documents_for_today(&rule).await?;

    let ids = documents
        .iter()
        .filter_map(|doc| doc.get_object_id("_id").ok().map(|id| id.to_hex()))
        .collect();
    Ok(Json(ids))
}

fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    if ADMIN_ROLES.iter().any(|role| auth.has_role(role)) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Requires System Manager or HR Manager role".to_string(),
        ))
    }
}

fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid rule id".to_string()))
}

fn from_body(body: RuleBody, id: Option<ObjectId>) -> NotificationRule {
    let now = DateTime::now();
    NotificationRule {
        id,
        name: body.name,
        document_type: body.document_type,
        event: body.event,
        enabled: body.enabled,
        subject: body.subject,
        message: body.message,
        message_format: body.message_format,
        condition: body.condition,
        date_field: body.date_field,
        days_in_advance: body.days_in_advance,
        value_field: body.value_field,
        recipients: body.recipients,
        created_at: now,
        updated_at: now,
    }
}

fn to_response(rule: NotificationRule) -> Result<RuleResponse, ApiError> {
    let id = rule
        .id
        .ok_or_else(|| ApiError::Internal("Missing rule id".to_string()))?;
    Ok(RuleResponse {
        id: id.to_hex(),
        name: rule.name,
        document_type: rule.document_type,
        event: rule.event,
        enabled: rule.enabled,
        subject: rule.subject,
        message: rule.message,
        message_format: rule.message_format,
        condition: rule.condition,
        date_field: rule.date_field,
        days_in_advance: rule.days_in_advance,
        value_field: rule.value_field,
        recipients: rule.recipients,
    })
}
