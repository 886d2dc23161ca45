use esshub_db::models::{PushNotification, SendFor};
use mongodb::Database;
use std::sync::Arc;
use tracing::warn;

use crate::dao::base::DaoResult;
use crate::dao::{DeviceDao, PushNotificationDao};

use super::fcm::FcmClient;

/// Manually authored pushes: single user, an explicit user list, or every
/// registered device. The gateway response is written back to the record
/// once the fan-out completes.
pub struct PushService {
    pushes: PushNotificationDao,
    devices: DeviceDao,
    fcm: Arc<FcmClient>,
}

impl PushService {
    pub fn new(db: &Database, fcm: Arc<FcmClient>) -> Self {
        Self {
            pushes: PushNotificationDao::new(db),
            devices: DeviceDao::new(db),
            fcm,
        }
    }

    pub async fn create_and_send(
        &self,
        send_for: SendFor,
        title: String,
        message: String,
        notification_type: Option<String>,
        user: Option<String>,
        users: Vec<String>,
    ) -> DaoResult<PushNotification> {
        let record = self
            .pushes
            .create(send_for, title, message, notification_type, user, users)
            .await?;

        let responses = self.dispatch(&record).await?;

        match record.id {
            Some(id) => {
                let serialized = serde_json::to_string(&responses).unwrap_or_default();
                self.pushes.set_response(id, &serialized).await?;
                self.pushes.base.find_by_id(id).await
            }
            None => Ok(record),
        }
    }

    async fn dispatch(&self, record: &PushNotification) -> DaoResult<Vec<serde_json::Value>> {
        let notification_type = record.notification_type.as_deref();

        let responses = match record.send_for {
            SendFor::SingleUser => {
                let Some(ref user) = record.user else {
                    warn!("Single User push without a target user, nothing sent");
                    return Ok(Vec::new());
                };
                match self.devices.token_for_user(user).await? {
                    Some(token) => vec![
                        self.fcm
                            .send_single(
                                &token,
                                &record.title,
                                &record.message,
                                Some(user),
                                notification_type,
                            )
                            .await,
                    ],
                    None => {
                        warn!(user, "No registered device for push target");
                        Vec::new()
                    }
                }
            }
            SendFor::MultipleUser => {
                let tokens: Vec<String> = self
                    .devices
                    .registrations_for_users(&record.users)
                    .await?
                    .into_iter()
                    .filter_map(|r| r.token)
                    .collect();
                self.fcm
                    .send_multiple(&tokens, &record.title, &record.message, notification_type)
                    .await
            }
            SendFor::AllUser => {
                let tokens = self.devices.all_tokens().await?;
                self.fcm
                    .send_multiple(&tokens, &record.title, &record.message, notification_type)
                    .await
            }
        };
        Ok(responses)
    }
}
