pub mod organization;
pub mod service;
pub mod business_hours;
pub mod appointment;

pub use organization::*;
pub use service::*;
pub use business_hours::*;
pub use appointment::*;
