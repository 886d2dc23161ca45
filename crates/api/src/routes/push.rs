use axum::{Json, extract::State, http::StatusCode};
use esshub_db::models::SendFor;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

const ADMIN_ROLES: [&str; 2] = ["System Manager", "HR Manager"];

#[derive(Debug, Deserialize)]
pub struct PushBody {
    pub send_for: SendFor,
    pub title: String,
    pub message: String,
    pub notification_type: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub id: String,
    pub send_for: SendFor,
    pub title: String,
    pub message: String,
    /// Serialized gateway responses, one per targeted device.
    pub response: Option<String>,
}

/// Creates the push record and performs the fan-out before answering, so
/// the response already carries the gateway result.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PushBody>,
) -> Result<(StatusCode, Json<PushResponse>), ApiError> {
    if !ADMIN_ROLES.iter().any(|role| auth.has_role(role)) {
        return Err(ApiError::Forbidden(
            "Requires System Manager or HR Manager role".to_string(),
        ));
    }

    if body.send_for == SendFor::SingleUser && body.user.is_none() {
        return Err(ApiError::BadRequest(
            "Single User sends require a target user".to_string(),
        ));
    }
    if body.send_for == SendFor::MultipleUser && body.users.is_empty() {
        return Err(ApiError::BadRequest(
            "Multiple User sends require a user list".to_string(),
        ));
    }

    let record = state
        .push
        .create_and_send(
            body.send_for,
            body.title,
            body.message,
            body.notification_type,
            body.user,
            body.users,
        )
        .await?;

    let id = record
        .id
        .ok_or_else(|| ApiError::Internal("Missing push id".to_string()))?;
    Ok((
        StatusCode::CREATED,
        Json(PushResponse {
            id: id.to_hex(),
            send_for: record.send_for,
            title: record.title,
            message: record.message,
            response: record.response,
        }),
    ))
}
