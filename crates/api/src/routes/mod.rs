pub mod attendance;
pub mod auth;
pub mod device;
pub mod push;
pub mod rules;
