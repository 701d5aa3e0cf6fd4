#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use slot_booking::config::{
    Config, DbConfig, JwtConfig, MailConfig, RateLimitConfig, SchedulingConfig, StripeConfig,
};
use slot_booking::error::{AppError, AppResult};
use slot_booking::models::{
    Appointment, AppointmentStatus, BusinessHours, CustomerInput, NewAppointment, Organization,
    Service, SubscriptionStatus,
};
use slot_booking::scheduling::interval::TimeRange;
use slot_booking::scheduling::clock::FixedClock;
use slot_booking::scheduling::reservation::ReservationInput;
use slot_booking::scheduling::{Scheduler, SlotPolicy};
use slot_booking::services::notifications::{Notification, NotificationError, Notifier};
use slot_booking::store::{MemoryStore, Store};

pub const JWT_SECRET: &str = "test-secret";
pub const CRON_SECRET: &str = "cron-secret";

/// 2026-10-19 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()
}

pub fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

/// Frozen "now" used by most tests: Monday 06:00, before opening.
pub fn early_monday() -> NaiveDateTime {
    at(monday(), 6, 0)
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// Background dispatch runs on spawned tasks; poll until `n` messages arrived.
    pub async fn wait_for(&self, n: usize) -> Vec<Notification> {
        for _ in 0..200 {
            let sent = self.sent().await;
            if sent.len() >= n {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent().await
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected(503))
    }
}

pub struct Tenant {
    pub org: Organization,
    pub service: Service,
}

/// Seeds an organization open Monday to Saturday 09:00-12:00 with one service.
pub async fn seed_tenant(store: &MemoryStore, slug: &str, duration_minutes: i64) -> Tenant {
    let org = Organization {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: format!("{slug} studio"),
        owner_id: Uuid::new_v4(),
        subscription_status: SubscriptionStatus::Trial,
        contact_email: Some(format!("owner@{slug}.test")),
        contact_phone: None,
        stripe_customer_id: Some(format!("cus_{slug}")),
        created_at: at(monday(), 0, 0) - chrono::Duration::days(30),
    };
    let service = Service {
        id: Uuid::new_v4(),
        organization_id: org.id,
        name: "Consultation".into(),
        duration_minutes,
        price_cents: 5000,
        description: None,
        features: vec![],
        archived_at: None,
    };
    store.put_organization(org.clone()).await;
    store.put_service(service.clone()).await;
    for weekday in 1..=6 {
        store
            .put_business_hours(
                BusinessHours::new(
                    org.id,
                    weekday,
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                )
                .unwrap(),
            )
            .await;
    }
    Tenant { org, service }
}

pub fn scheduler(
    store: &MemoryStore,
    notifier: Arc<dyn Notifier>,
    now: NaiveDateTime,
) -> Scheduler {
    Scheduler::new(
        Arc::new(store.clone()),
        notifier,
        Arc::new(FixedClock(now)),
        SlotPolicy::new(15),
    )
}

pub fn customer(name: &str) -> CustomerInput {
    CustomerInput {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: Some("+1 555 0100 200".into()),
    }
}

pub fn booking(service_id: Uuid, start: NaiveDateTime, name: &str) -> ReservationInput {
    ReservationInput {
        service_id,
        start,
        customer: customer(name),
        payment_proof_url: Some("https://files.example.com/proof.png".into()),
    }
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        app_env: "test".into(),
        db: DbConfig {
            host: "localhost".into(),
            port: 5432,
            database: "slot_booking_test".into(),
            user: "test".into(),
            password: String::new(),
            pool_min: 1,
            pool_max: 1,
            acquire_timeout_secs: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.into(),
        },
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: 1_000,
            booking_max: 1_000,
        },
        scheduling: SchedulingConfig {
            buffer_minutes: 15,
            reminder_lead_secs: 86_400,
        },
        mail: MailConfig {
            api_url: "http://mail.invalid/send".into(),
            api_key: String::new(),
            from_address: "bookings@example.test".into(),
        },
        stripe: StripeConfig {
            webhook_secret: String::new(),
        },
        cron_secret: CRON_SECRET.into(),
    }
}

/// Delegates to a [`MemoryStore`] but fails every organization lookup, as a
/// storage timeout would.
pub struct OrganizationLookupTimesOut(pub MemoryStore);

#[async_trait]
impl Store for OrganizationLookupTimesOut {
    async fn ping(&self) -> AppResult<()> {
        self.0.ping().await
    }

    async fn organization(&self, _id: Uuid) -> AppResult<Option<Organization>> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn organization_by_slug(&self, slug: &str) -> AppResult<Option<Organization>> {
        self.0.organization_by_slug(slug).await
    }

    async fn services(&self, organization_id: Uuid) -> AppResult<Vec<Service>> {
        self.0.services(organization_id).await
    }

    async fn service(&self, id: Uuid) -> AppResult<Option<Service>> {
        self.0.service(id).await
    }

    async fn business_hours(
        &self,
        organization_id: Uuid,
        weekday: u8,
    ) -> AppResult<Option<BusinessHours>> {
        self.0.business_hours(organization_id, weekday).await
    }

    async fn appointments_overlapping(
        &self,
        organization_id: Uuid,
        range: TimeRange,
    ) -> AppResult<Vec<Appointment>> {
        self.0.appointments_overlapping(organization_id, range).await
    }

    async fn insert_appointment(&self, new: NewAppointment) -> AppResult<Appointment> {
        self.0.insert_appointment(new).await
    }

    async fn appointment(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        self.0.appointment(organization_id, id).await
    }

    async fn appointment_by_handle(&self, handle: &str) -> AppResult<Option<Appointment>> {
        self.0.appointment_by_handle(handle).await
    }

    async fn update_appointment_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Option<Appointment>> {
        self.0
            .update_appointment_status(organization_id, id, from, to)
            .await
    }

    async fn delete_appointment(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        self.0.delete_appointment(organization_id, id).await
    }

    async fn reminders_due(&self, window: TimeRange) -> AppResult<Vec<Appointment>> {
        self.0.reminders_due(window).await
    }

    async fn mark_reminder_sent(&self, organization_id: Uuid, id: Uuid) -> AppResult<()> {
        self.0.mark_reminder_sent(organization_id, id).await
    }

    async fn set_subscription_status(
        &self,
        stripe_customer_id: &str,
        status: SubscriptionStatus,
    ) -> AppResult<Option<Uuid>> {
        self.0
            .set_subscription_status(stripe_customer_id, status)
            .await
    }
}
