use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub push: PushSettings,
    pub webhook: WebhookSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    /// Public base URL of this deployment, sent along with partner webhooks.
    pub base_url: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

/// FCM HTTP v1 gateway. The service-account file carries the signing key
/// and token endpoint; a bearer token is exchanged per send.
#[derive(Debug, Deserialize, Clone)]
pub struct PushSettings {
    pub project_id: String,
    pub service_account_file: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookSettings {
    /// Partner endpoint that relays log entries out-of-band. Empty disables it.
    pub endpoint: String,
    pub product_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    /// Global kill switch for the rule engine.
    pub enabled: bool,
    /// Cron expression for the daily time-based rule sweep.
    pub sweep_schedule: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("ESSHUB"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.base_url", "http://localhost:3000")?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "esshub")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.issuer", "esshub")?
            .set_default("push.project_id", "")?
            .set_default("push.service_account_file", "config/firebase-service-account.json")?
            .set_default("push.timeout_secs", 30)?
            .set_default("webhook.endpoint", "")?
            .set_default("webhook.product_name", "ESS Hub")?
            .set_default("webhook.timeout_secs", 30)?
            .set_default("notifications.enabled", true)?
            .set_default("notifications.sweep_schedule", "0 0 7 * * *")?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
