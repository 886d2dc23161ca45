pub mod engine;
pub mod fcm;
pub mod push_service;
pub mod recipients;
pub mod webhook;

pub use engine::{LifecycleEvent, NotificationEngine, NotifyError};
pub use fcm::FcmClient;
pub use push_service::PushService;
pub use webhook::WebhookRelay;
