pub mod notifications;
pub mod reminders;
pub mod stripe_service;
pub mod subscription_sync;
pub mod tokens;
