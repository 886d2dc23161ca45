use esshub_config::PushSettings;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

#[derive(Debug, Error)]
pub enum FcmError {
    #[error("Service account file error: {0}")]
    ServiceAccount(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}

#[derive(Debug, Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct TokenClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// FCM HTTP v1 client. Failures never propagate to the caller: every send
/// returns a response value, error-shaped when the gateway or transport
/// failed, and the failure is logged with full detail.
pub struct FcmClient {
    settings: PushSettings,
    client: reqwest::Client,
}

impl FcmClient {
    pub fn new(settings: &PushSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            settings: settings.clone(),
            client,
        }
    }

    /// Exchanges the service-account key for a short-lived bearer token.
    /// A fresh token per send; callers that need caching add it above.
    async fn access_token(&self) -> Result<String, FcmError> {
        let raw = std::fs::read_to_string(&self.settings.service_account_file)
            .map_err(|e| FcmError::ServiceAccount(e.to_string()))?;
        let account: ServiceAccount =
            serde_json::from_str(&raw).map_err(|e| FcmError::ServiceAccount(e.to_string()))?;

        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            iss: account.client_email.clone(),
            scope: FCM_SCOPE.to_string(),
            aud: account.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| FcmError::ServiceAccount(e.to_string()))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| FcmError::TokenExchange(e.to_string()))?;

        let response: TokenResponse = self
            .client
            .post(&account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FcmError::TokenExchange(e.to_string()))?
            .json()
            .await
            .map_err(|e| FcmError::TokenExchange(e.to_string()))?;

        Ok(response.access_token)
    }

    /// One push to one device. The `user` is carried for diagnostics only.
    pub async fn send_single(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        user: Option<&str>,
        notification_type: Option<&str>,
    ) -> serde_json::Value {
        debug!(?user, notification_type, "Sending push notification");

        let bearer = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                error!(%e, "FCM credential exchange failed");
                return serde_json::json!({ "error": e.to_string() });
            }
        };

        let url = format!(
            "{FCM_BASE_URL}/v1/projects/{}/messages:send",
            self.settings.project_id
        );
        let payload = message_payload(device_token, title, body, notification_type);

        let result = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                let body: serde_json::Value = response
                    .json()
                    .await
                    .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
                if !status.is_success() {
                    error!(%status, %body, "FCM send returned an error");
                }
                body
            }
            Err(e) => {
                error!(%e, "FCM send failed");
                serde_json::json!({ "error": e.to_string() })
            }
        }
    }

    /// Sequential fan-out, one gateway call per token. No batching.
    pub async fn send_multiple(
        &self,
        device_tokens: &[String],
        title: &str,
        body: &str,
        notification_type: Option<&str>,
    ) -> Vec<serde_json::Value> {
        let mut responses = Vec::with_capacity(device_tokens.len());
        for token in device_tokens {
            responses.push(
                self.send_single(token, title, body, None, notification_type)
                    .await,
            );
        }
        responses
    }
}

fn message_payload(
    device_token: &str,
    title: &str,
    body: &str,
    notification_type: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "token": device_token,
            "notification": {
                "title": title,
                "body": body,
            },
            "data": {
                "notification_type": notification_type.unwrap_or_default(),
            },
        }
    })
}
