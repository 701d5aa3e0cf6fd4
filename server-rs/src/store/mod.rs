//! Relational capability the scheduling core needs.
//!
//! Every appointment query takes an organization id. The one exception is
//! the reminder sweep, which walks all tenants but never mixes their rows.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Appointment, AppointmentStatus, BusinessHours, NewAppointment, Organization, Service,
    SubscriptionStatus,
};
use crate::scheduling::interval::TimeRange;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    async fn organization(&self, id: Uuid) -> AppResult<Option<Organization>>;
    async fn organization_by_slug(&self, slug: &str) -> AppResult<Option<Organization>>;

    /// Active (non-archived) services of an organization.
    async fn services(&self, organization_id: Uuid) -> AppResult<Vec<Service>>;
    async fn service(&self, id: Uuid) -> AppResult<Option<Service>>;

    async fn business_hours(
        &self,
        organization_id: Uuid,
        weekday: u8,
    ) -> AppResult<Option<BusinessHours>>;

    /// Appointments of one organization whose interval intersects `range`,
    /// ordered by start time.
    async fn appointments_overlapping(
        &self,
        organization_id: Uuid,
        range: TimeRange,
    ) -> AppResult<Vec<Appointment>>;

    /// Atomic check-and-insert. Fails with `AppError::Conflict` when any
    /// appointment of the same organization overlaps `new.interval`.
    async fn insert_appointment(&self, new: NewAppointment) -> AppResult<Appointment>;

    async fn appointment(&self, organization_id: Uuid, id: Uuid)
        -> AppResult<Option<Appointment>>;
    async fn appointment_by_handle(&self, handle: &str) -> AppResult<Option<Appointment>>;

    /// Moves `from` to `to`. `None` when the row is missing or no longer `from`.
    async fn update_appointment_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Option<Appointment>>;

    /// Returns whether a row was removed.
    async fn delete_appointment(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Appointments starting inside `window` that have not been reminded yet.
    async fn reminders_due(&self, window: TimeRange) -> AppResult<Vec<Appointment>>;
    async fn mark_reminder_sent(&self, organization_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Returns the organization the stripe customer belongs to, if any.
    async fn set_subscription_status(
        &self,
        stripe_customer_id: &str,
        status: SubscriptionStatus,
    ) -> AppResult<Option<Uuid>>;
}
