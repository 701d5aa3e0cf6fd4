use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Appointment, AppointmentStatus, BookingChannel, Customer, CustomerInput, NewAppointment,
    Organization, ReservationReceipt,
};
use crate::services::{notifications, tokens};

use super::availability::resolve_service;
use super::interval::TimeRange;
use super::Scheduler;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 120;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern compiles"))
}

/// Normalizes and checks customer details before anything touches storage.
pub fn validate_customer(input: CustomerInput) -> AppResult<Customer> {
    let name = input.name.trim().to_string();
    let name_len = name.chars().count();
    if name_len < NAME_MIN_CHARS {
        return Err(AppError::Validation(format!(
            "name must be at least {NAME_MIN_CHARS} characters"
        )));
    }
    if name_len > NAME_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "name must be at most {NAME_MAX_CHARS} characters"
        )));
    }

    let email = input.email.trim().to_string();
    if !email_pattern().is_match(&email) {
        return Err(AppError::Validation("email address is not valid".into()));
    }

    let phone = match input.phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(p) if phone_pattern().is_match(p) => Some(p.to_string()),
        Some(_) => return Err(AppError::Validation("phone number is not valid".into())),
    };

    Ok(Customer { name, email, phone })
}

#[derive(Debug)]
pub struct ReservationInput {
    pub service_id: Uuid,
    pub start: NaiveDateTime,
    pub customer: CustomerInput,
    pub payment_proof_url: Option<String>,
}

/// Customer-facing view of a booking, reached through its cancellation handle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub organization_name: String,
    pub organization_slug: String,
    pub service_name: String,
    pub appointment: Appointment,
}

impl Scheduler {
    /// Re-checks overlap and records the appointment in one atomic store call.
    ///
    /// `organization_scope` restricts the service to one tenant (dashboard
    /// entry); public bookings derive the tenant from the service.
    pub async fn reserve(
        &self,
        input: ReservationInput,
        channel: BookingChannel,
        organization_scope: Option<Uuid>,
    ) -> AppResult<ReservationReceipt> {
        let customer = validate_customer(input.customer)?;
        let payment_proof_url = input
            .payment_proof_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        // Same boundary as the availability listing: a slot starting now is open.
        if input.start < self.clock.now() {
            return Err(AppError::Validation(
                "start time must not be in the past".into(),
            ));
        }

        let (organization, service) =
            resolve_service(self.store.as_ref(), organization_scope, input.service_id).await?;
        let interval = TimeRange::starting_at(input.start, self.policy.slot_length(&service))?;

        let new = NewAppointment {
            id: Uuid::new_v4(),
            organization_id: organization.id,
            service_id: service.id,
            interval,
            customer,
            status: channel.initial_status(),
            cancellation_handle: tokens::cancellation_handle(),
            payment_proof_url,
        };

        let appointment = match self.store.insert_appointment(new).await {
            Ok(a) => a,
            Err(AppError::Conflict(msg)) => {
                tracing::info!(
                    organization_id = %organization.id,
                    service_id = %service.id,
                    start = %interval.start,
                    "reservation rejected: {msg}"
                );
                return Err(AppError::Conflict(msg));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            organization_id = %organization.id,
            appointment_id = %appointment.id,
            status = %appointment.status,
            ?channel,
            "appointment reserved"
        );

        let mut messages = vec![notifications::booking_received(
            &organization,
            &service,
            &appointment,
        )];
        if channel == BookingChannel::Public {
            messages.extend(notifications::new_booking_alert(
                &organization,
                &service,
                &appointment,
            ));
        }
        notifications::dispatch(self.notifier.clone(), messages);

        Ok(ReservationReceipt::from(&appointment))
    }

    /// Toggles between pending and confirmed and notifies the customer.
    pub async fn set_status(
        &self,
        organization: &Organization,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let current = self
            .store
            .appointment(organization.id, appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        if current.status == status {
            return Err(AppError::Validation(format!(
                "appointment is already {status}"
            )));
        }

        // Only applies if nobody changed the status since it was read.
        let updated = match self
            .store
            .update_appointment_status(organization.id, appointment_id, current.status, status)
            .await?
        {
            Some(updated) => updated,
            None => {
                return match self.store.appointment(organization.id, appointment_id).await? {
                    Some(_) => Err(AppError::Validation(format!(
                        "appointment is already {status}"
                    ))),
                    None => Err(AppError::NotFound("Appointment not found".into())),
                };
            }
        };

        tracing::info!(
            organization_id = %organization.id,
            appointment_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            "appointment status changed"
        );

        notifications::dispatch(
            self.notifier.clone(),
            vec![notifications::status_changed(organization, &updated)],
        );
        Ok(updated)
    }

    pub async fn booking_by_handle(&self, handle: &str) -> AppResult<BookingView> {
        let appointment = self
            .store
            .appointment_by_handle(handle)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        let organization = self
            .store
            .organization(appointment.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;
        let service_name = self
            .store
            .service(appointment.service_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();

        Ok(BookingView {
            organization_name: organization.name,
            organization_slug: organization.slug,
            service_name,
            appointment,
        })
    }

    /// Customer cancellation. Deletes the appointment and alerts the owner.
    pub async fn cancel_by_handle(&self, handle: &str) -> AppResult<()> {
        let appointment = self
            .store
            .appointment_by_handle(handle)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        if !self
            .store
            .delete_appointment(appointment.organization_id, appointment.id)
            .await?
        {
            return Err(AppError::NotFound("Booking not found".into()));
        }

        tracing::info!(
            organization_id = %appointment.organization_id,
            appointment_id = %appointment.id,
            "appointment cancelled by customer"
        );

        // The booking is gone either way; a failed lookup only costs the owner alert.
        match self.store.organization(appointment.organization_id).await {
            Ok(Some(organization)) => notifications::dispatch(
                self.notifier.clone(),
                notifications::cancellation_alert(&organization, &appointment)
                    .into_iter()
                    .collect(),
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                organization_id = %appointment.organization_id,
                appointment_id = %appointment.id,
                error = %e,
                "cancellation alert skipped"
            ),
        }
        Ok(())
    }

    /// Owner cancellation from the dashboard. The customer is told.
    pub async fn cancel_by_owner(
        &self,
        organization: &Organization,
        appointment_id: Uuid,
    ) -> AppResult<()> {
        let appointment = self
            .store
            .appointment(organization.id, appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        if !self
            .store
            .delete_appointment(organization.id, appointment_id)
            .await?
        {
            return Err(AppError::NotFound("Appointment not found".into()));
        }

        tracing::info!(
            organization_id = %organization.id,
            appointment_id = %appointment_id,
            "appointment cancelled by owner"
        );

        notifications::dispatch(
            self.notifier.clone(),
            vec![notifications::cancelled_by_business(organization, &appointment)],
        );
        Ok(())
    }

    /// All appointments of one organization touching `date`.
    pub async fn day_schedule(
        &self,
        organization: &Organization,
        date: NaiveDate,
    ) -> AppResult<Vec<Appointment>> {
        self.store
            .appointments_overlapping(organization.id, TimeRange::day(date))
            .await
    }
}
