use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::scheduling::interval::TimeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            other => Err(AppError::Validation(format!(
                "unknown appointment status '{other}'"
            ))),
        }
    }
}

/// Where a reservation came from. Decides the initial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingChannel {
    /// Visitor self-service; waits for the owner to review payment proof.
    Public,
    /// Entered by the owner from the dashboard.
    Manual,
}

impl BookingChannel {
    pub fn initial_status(&self) -> AppointmentStatus {
        match self {
            BookingChannel::Public => AppointmentStatus::Pending,
            BookingChannel::Manual => AppointmentStatus::Confirmed,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: String,
    pub cancellation_handle: String,
    pub reminder_sent: bool,
    pub payment_proof_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A stored reservation. `end_time` already includes the buffer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub customer: Customer,
    pub status: AppointmentStatus,
    #[serde(skip_serializing)]
    pub cancellation_handle: String,
    pub reminder_sent: bool,
    pub payment_proof_url: Option<String>,
}

impl Appointment {
    pub fn interval(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AppError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        if row.end_time <= row.start_time {
            return Err(AppError::Internal(format!(
                "appointment {} ends before it starts",
                row.id
            )));
        }
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            organization_id: row.organization_id,
            service_id: row.service_id,
            start_time: row.start_time,
            end_time: row.end_time,
            customer: Customer {
                name: row.customer_name,
                email: row.customer_email,
                phone: row.customer_phone,
            },
            cancellation_handle: row.cancellation_handle,
            reminder_sent: row.reminder_sent,
            payment_proof_url: row.payment_proof_url,
        })
    }
}

/// Fully computed row handed to the store for the atomic check-and-insert.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub interval: TimeRange,
    pub customer: Customer,
    pub status: AppointmentStatus,
    pub cancellation_handle: String,
    pub payment_proof_url: Option<String>,
}

impl NewAppointment {
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id,
            organization_id: self.organization_id,
            service_id: self.service_id,
            start_time: self.interval.start,
            end_time: self.interval.end,
            customer: self.customer,
            status: self.status,
            cancellation_handle: self.cancellation_handle,
            reminder_sent: false,
            payment_proof_url: self.payment_proof_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    #[serde(rename = "serviceId")]
    pub service_id: Uuid,
    #[serde(rename = "startTime")]
    pub start_time: String,
    pub customer: CustomerInput,
    #[serde(rename = "paymentProofUrl")]
    pub payment_proof_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationReceipt {
    pub cancellation_handle: String,
    pub appointment_id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for ReservationReceipt {
    fn from(a: &Appointment) -> Self {
        Self {
            cancellation_handle: a.cancellation_handle.clone(),
            appointment_id: a.id,
            start_time: a.start_time,
            end_time: a.end_time,
            status: a.status,
        }
    }
}
