pub mod attendance_request;
pub mod base;
pub mod custom_field;
pub mod device;
pub mod employee;
pub mod notification_log;
pub mod notification_rule;
pub mod push_notification;
pub mod shift_type;
pub mod user;

pub use attendance_request::AttendanceRequestDao;
pub use custom_field::CustomFieldDao;
pub use device::DeviceDao;
pub use employee::EmployeeDao;
pub use notification_log::NotificationLogDao;
pub use notification_rule::NotificationRuleDao;
pub use push_notification::PushNotificationDao;
pub use shift_type::ShiftTypeDao;
pub use user::UserDao;
