use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !user.enabled {
        return Err(ApiError::Unauthorized("Account disabled".to_string()));
    }

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    let valid = state.auth.verify_password(&body.password, password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_id = user.id.ok_or(ApiError::Internal("Missing user id".to_string()))?;
    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.roles)?;

    let mut headers = HeaderMap::new();
    let cookie = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.access_token, tokens.expires_in
    );
    if let Ok(value) = cookie.parse() {
        headers.insert(header::SET_COOKIE, value);
    }

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserResponse {
            id: user_id.to_hex(),
            email: user.email,
            full_name: user.full_name,
            roles: user.roles,
        },
    };

    Ok((headers, Json(response)))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;

    let user = state.users.base.find_by_id(user_id).await?;
    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.roles)?;

    Ok(Json(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserResponse {
            id: user_id.to_hex(),
            email: user.email,
            full_name: user.full_name,
            roles: user.roles,
        },
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;

    Ok(Json(UserResponse {
        id: auth.user_id.to_hex(),
        email: user.email,
        full_name: user.full_name,
        roles: user.roles,
    }))
}

pub async fn logout() -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let cookie = "access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0";
    if let Ok(value) = cookie.parse() {
        headers.insert(header::SET_COOKIE, value);
    }
    Ok(headers)
}
