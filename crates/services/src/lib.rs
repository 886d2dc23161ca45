pub mod auth;
pub mod background;
pub mod cache;
pub mod condition;
pub mod dao;
pub mod notify;
pub mod records;
pub mod schema;
pub mod template;

pub use auth::AuthService;
pub use cache::{RuleCache, SchemaCache};
pub use dao::*;
pub use notify::{FcmClient, NotificationEngine, PushService, WebhookRelay};
pub use records::RecordStore;
pub use schema::SchemaRegistry;
pub use template::TemplateService;
