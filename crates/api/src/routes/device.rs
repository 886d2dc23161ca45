use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::error;

use crate::{envelope::Envelope, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct DeviceBody {
    /// Push token from the mobile app; null clears the registration.
    pub token: Option<String>,
}

/// Registers the caller's device token. One registration per user; logging
/// in on a new device replaces the previous token.
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DeviceBody>,
) -> Json<Envelope> {
    match state.devices.register(&auth.email, body.token.as_deref()).await {
        Ok(()) => Envelope::ok("Device registered", serde_json::json!({})),
        Err(e) => {
            error!(%e, "Failed to register device");
            Envelope::err(500, "Unable to register device")
        }
    }
}
