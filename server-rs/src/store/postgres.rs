use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Appointment, AppointmentRow, AppointmentStatus, BusinessHours, BusinessHoursRow,
    NewAppointment, Organization, OrganizationRow, Service, ServiceRow, SubscriptionStatus,
};
use crate::scheduling::interval::TimeRange;

use super::Store;

const ORGANIZATION_COLUMNS: &str = "id, slug, name, owner_id, subscription_status, \
     contact_email, contact_phone, stripe_customer_id, created_at";

const SERVICE_COLUMNS: &str =
    "id, organization_id, name, duration_minutes, price_cents, description, features, archived_at";

const APPOINTMENT_COLUMNS: &str = "id, organization_id, service_id, start_time, end_time, \
     customer_name, customer_email, customer_phone, status, cancellation_handle, \
     reminder_sent, payment_proof_url";

// SQLSTATE codes raised by the appointments constraints.
const EXCLUSION_VIOLATION: &str = "23P01";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.code().as_deref() {
            Some(EXCLUSION_VIOLATION) => {
                return AppError::Conflict("slot already taken".into());
            }
            Some(UNIQUE_VIOLATION) => {
                return AppError::Conflict("duplicate cancellation handle, retry".into());
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

fn convert_all<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let row: Option<OrganizationRow> = sqlx::query_as(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Organization::try_from).transpose()
    }

    async fn organization_by_slug(&self, slug: &str) -> AppResult<Option<Organization>> {
        let row: Option<OrganizationRow> = sqlx::query_as(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Organization::try_from).transpose()
    }

    async fn services(&self, organization_id: Uuid) -> AppResult<Vec<Service>> {
        let rows: Vec<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE organization_id = $1 AND archived_at IS NULL ORDER BY name"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn service(&self, id: Uuid) -> AppResult<Option<Service>> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Service::try_from).transpose()
    }

    async fn business_hours(
        &self,
        organization_id: Uuid,
        weekday: u8,
    ) -> AppResult<Option<BusinessHours>> {
        let row: Option<BusinessHoursRow> = sqlx::query_as(
            "SELECT organization_id, day_of_week, open_time, close_time FROM business_hours \
             WHERE organization_id = $1 AND day_of_week = $2",
        )
        .bind(organization_id)
        .bind(i16::from(weekday))
        .fetch_optional(&self.pool)
        .await?;
        row.map(BusinessHours::try_from).transpose()
    }

    async fn appointments_overlapping(
        &self,
        organization_id: Uuid,
        range: TimeRange,
    ) -> AppResult<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE organization_id = $1 AND start_time < $3 AND end_time > $2 \
             ORDER BY start_time"
        ))
        .bind(organization_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM appointments \
             WHERE organization_id = $1 AND start_time < $3 AND end_time > $2)",
        )
        .bind(new.organization_id)
        .bind(new.interval.start)
        .bind(new.interval.end)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(AppError::Conflict("slot already taken".into()));
        }

        // A concurrent insert that slipped past the check above is rejected by
        // the appointments_no_overlap exclusion constraint.
        let row: AppointmentRow = sqlx::query_as(&format!(
            "INSERT INTO appointments (id, organization_id, service_id, start_time, end_time, \
             customer_name, customer_email, customer_phone, status, cancellation_handle, \
             reminder_sent, payment_proof_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, $11) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(new.id)
        .bind(new.organization_id)
        .bind(new.service_id)
        .bind(new.interval.start)
        .bind(new.interval.end)
        .bind(&new.customer.name)
        .bind(&new.customer.email)
        .bind(&new.customer.phone)
        .bind(new.status.as_str())
        .bind(&new.cancellation_handle)
        .bind(&new.payment_proof_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit().await.map_err(map_insert_error)?;
        Appointment::try_from(row)
    }

    async fn appointment(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 AND organization_id = $2"
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Appointment::try_from).transpose()
    }

    async fn appointment_by_handle(&self, handle: &str) -> AppResult<Option<Appointment>> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE cancellation_handle = $1"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Appointment::try_from).transpose()
    }

    async fn update_appointment_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> AppResult<Option<Appointment>> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "UPDATE appointments SET status = $4 \
             WHERE id = $1 AND organization_id = $2 AND status = $3 \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(organization_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Appointment::try_from).transpose()
    }

    async fn delete_appointment(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM appointments WHERE id = $1 AND organization_id = $2")
                .bind(id)
                .bind(organization_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reminders_due(&self, window: TimeRange) -> AppResult<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE reminder_sent = FALSE AND start_time >= $1 AND start_time < $2 \
             ORDER BY organization_id, start_time"
        ))
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn mark_reminder_sent(&self, organization_id: Uuid, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE appointments SET reminder_sent = TRUE WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_subscription_status(
        &self,
        stripe_customer_id: &str,
        status: SubscriptionStatus,
    ) -> AppResult<Option<Uuid>> {
        let org_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE organizations SET subscription_status = $2 \
             WHERE stripe_customer_id = $1 RETURNING id",
        )
        .bind(stripe_customer_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(org_id)
    }
}
