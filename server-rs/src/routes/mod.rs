pub mod availability;
pub mod bookings;
pub mod dashboard;
pub mod health;
pub mod internal;
pub mod organizations;
pub mod webhooks;
