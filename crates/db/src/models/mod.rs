pub mod attendance_request;
pub mod custom_field;
pub mod device;
pub mod employee;
pub mod notification_log;
pub mod notification_rule;
pub mod push_notification;
pub mod shift_type;
pub mod user;

pub use attendance_request::AttendanceRequest;
pub use custom_field::{CustomField, FieldKind};
pub use device::DeviceRegistration;
pub use employee::Employee;
pub use notification_log::NotificationLog;
pub use notification_rule::{
    MessageFormat, NotificationRule, RecipientSource, RecipientSpec, TriggerEvent,
};
pub use push_notification::{PushNotification, SendFor};
pub use shift_type::ShiftType;
pub use user::User;
