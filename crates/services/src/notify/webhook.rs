use esshub_db::models::NotificationLog;
use esshub_config::{AppSettings, WebhookSettings};
use std::time::Duration;
use tracing::{debug, error};

/// Out-of-band partner relay: every log entry is also posted to a fixed
/// external endpoint. Failures are logged, never raised — the log entry
/// stands regardless of delivery.
pub struct WebhookRelay {
    settings: WebhookSettings,
    erp_url: String,
    client: reqwest::Client,
}

impl WebhookRelay {
    pub fn new(settings: &WebhookSettings, app: &AppSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            settings: settings.clone(),
            erp_url: app.base_url.clone(),
            client,
        }
    }

    pub async fn relay(&self, entry: &NotificationLog) {
        if self.settings.endpoint.is_empty() {
            debug!("Partner webhook not configured, skipping relay");
            return;
        }

        let payload = self.payload(entry);
        match self
            .client
            .post(&self.settings.endpoint)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(rule = %entry.rule_name, "Partner webhook relayed");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    %status,
                    %body,
                    rule = %entry.rule_name,
                    "Partner webhook returned an error"
                );
            }
            Err(e) => {
                error!(%e, rule = %entry.rule_name, "Partner webhook send failed");
            }
        }
    }

    fn payload(&self, entry: &NotificationLog) -> serde_json::Value {
        serde_json::json!({
            "product_name": self.settings.product_name,
            "subject": entry.subject,
            "message": entry.message,
            "notification_type": "info",
            "tokens": [entry.token],
            "erp_url": self.erp_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::DateTime;

    fn sample_entry() -> NotificationLog {
        NotificationLog {
            id: None,
            rule_name: "Expiry Alert".to_string(),
            document_type: "Attendance Request".to_string(),
            subject: "Heads up".to_string(),
            message: "Expiring soon".to_string(),
            recipient: "alice@test.com".to_string(),
            token: "tok-1".to_string(),
            created_at: DateTime::now(),
        }
    }

    #[test]
    fn payload_carries_single_token_list() {
        let relay = WebhookRelay::new(
            &WebhookSettings {
                endpoint: "https://partner.example/notify".to_string(),
                product_name: "ESS Hub".to_string(),
                timeout_secs: 30,
            },
            &AppSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                base_url: "https://erp.example".to_string(),
                cors_origins: vec![],
            },
        );

        let payload = relay.payload(&sample_entry());
        assert_eq!(payload["product_name"], "ESS Hub");
        assert_eq!(payload["tokens"], serde_json::json!(["tok-1"]));
        assert_eq!(payload["notification_type"], "info");
        assert_eq!(payload["erp_url"], "https://erp.example");
    }
}
