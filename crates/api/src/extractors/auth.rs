use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use bson::oid::ObjectId;
use esshub_services::auth::Claims;

use crate::{error::ApiError, state::AppState};

/// Extracts the authenticated user from JWT (cookie or Authorization header)
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub email: String,
    pub roles: Vec<String>,
    pub claims: Claims,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Try Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|s| s.to_string())
            // Then try cookie
            .or_else(|| {
                parts
                    .headers
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|cookies| {
                        cookies.split(';').find_map(|cookie| {
                            let cookie = cookie.trim();
                            cookie
                                .strip_prefix("access_token=")
                                .map(|s| s.to_string())
                        })
                    })
            })
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = app_state.auth.verify_access_token(&token)?;

        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            claims,
        })
    }
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
