use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Appointment, AppointmentStatus, BusinessHours, NewAppointment, Organization, Service,
    SubscriptionStatus,
};
use crate::scheduling::interval::TimeRange;

use super::Store;

/// In-process store. All tables sit behind one lock, so the overlap check
/// and the insert in [`Store::insert_appointment`] happen as one step.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    organizations: HashMap<Uuid, Organization>,
    services: HashMap<Uuid, Service>,
    hours: HashMap<(Uuid, u8), BusinessHours>,
    appointments: HashMap<Uuid, Appointment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_organization(&self, organization: Organization) {
        let mut tables = self.tables.lock().await;
        tables.organizations.insert(organization.id, organization);
    }

    pub async fn put_service(&self, service: Service) {
        let mut tables = self.tables.lock().await;
        tables.services.insert(service.id, service);
    }

    /// Upserts the opening window for `(organization, weekday)`.
    pub async fn put_business_hours(&self, hours: BusinessHours) {
        let mut tables = self.tables.lock().await;
        tables
            .hours
            .insert((hours.organization_id, hours.weekday), hours);
    }

    pub async fn all_appointments(&self, organization_id: Uuid) -> Vec<Appointment> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        rows
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let tables = self.tables.lock().await;
        Ok(tables.organizations.get(&id).cloned())
    }

    async fn organization_by_slug(&self, slug: &str) -> AppResult<Option<Organization>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .organizations
            .values()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn services(&self, organization_id: Uuid) -> AppResult<Vec<Service>> {
        let tables = self.tables.lock().await;
        let mut services: Vec<Service> = tables
            .services
            .values()
            .filter(|s| s.organization_id == organization_id && s.is_bookable())
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn service(&self, id: Uuid) -> AppResult<Option<Service>> {
        let tables = self.tables.lock().await;
        Ok(tables.services.get(&id).cloned())
    }

    async fn business_hours(
        &self,
        organization_id: Uuid,
        weekday: u8,
    ) -> AppResult<Option<BusinessHours>> {
        let tables = self.tables.lock().await;
        Ok(tables.hours.get(&(organization_id, weekday)).cloned())
    }

    async fn appointments_overlapping(
        &self,
        organization_id: Uuid,
        range: TimeRange,
    ) -> AppResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.organization_id == organization_id && a.interval().overlaps(&range))
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> AppResult<Appointment> {
        let mut tables = self.tables.lock().await;

        let taken = tables.appointments.values().any(|a| {
            a.organization_id == new.organization_id && a.interval().overlaps(&new.interval)
        });
        if taken {
            return Err(AppError::Conflict("slot already taken".into()));
        }
        if tables
            .appointments
            .values()
            .any(|a| a.cancellation_handle == new.cancellation_handle)
        {
            return Err(AppError::Conflict(
                "duplicate cancellation handle, retry".into(),
            ));
        }

        let appointment = new.into_appointment();
        tables
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn appointment(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .get(&id)
            .filter(|a| a.organization_id == organization_id)
            .cloned())
    }

    async fn appointment_by_handle(&self, handle: &str) -> AppResult<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .values()
            .find(|a| a.cancellation_handle == handle)
            .cloned())
    }

    async fn update_appointment_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Option<Appointment>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .get_mut(&id)
            .filter(|a| a.organization_id == organization_id && a.status == from)
            .map(|a| {
                a.status = to;
                a.clone()
            }))
    }

    async fn delete_appointment(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let owned = tables
            .appointments
            .get(&id)
            .is_some_and(|a| a.organization_id == organization_id);
        if owned {
            tables.appointments.remove(&id);
        }
        Ok(owned)
    }

    async fn reminders_due(&self, window: TimeRange) -> AppResult<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| {
                !a.reminder_sent && a.start_time >= window.start && a.start_time < window.end
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.organization_id, a.start_time));
        Ok(rows)
    }

    async fn mark_reminder_sent(&self, organization_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(a) = tables
            .appointments
            .get_mut(&id)
            .filter(|a| a.organization_id == organization_id)
        {
            a.reminder_sent = true;
        }
        Ok(())
    }

    async fn set_subscription_status(
        &self,
        stripe_customer_id: &str,
        status: SubscriptionStatus,
    ) -> AppResult<Option<Uuid>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .organizations
            .values_mut()
            .find(|o| o.stripe_customer_id.as_deref() == Some(stripe_customer_id))
            .map(|o| {
                o.subscription_status = status;
                o.id
            }))
    }
}
