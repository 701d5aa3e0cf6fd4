use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::config::MailConfig;
use crate::models::{Appointment, AppointmentStatus, Organization, Service};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with status {0}")]
    Rejected(u16),
}

/// Best-effort outbound messaging.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Posts messages to a transactional mail HTTP API.
#[derive(Clone)]
pub struct HttpMailer {
    api_url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            return None;
        }
        Some(Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [notification.to],
                "subject": notification.subject,
                "text": notification.body,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotificationError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "mail delivery not configured, message logged only"
        );
        Ok(())
    }
}

pub fn notifier_from_config(config: &MailConfig) -> Arc<dyn Notifier> {
    match HttpMailer::new(config) {
        Some(mailer) => Arc::new(mailer),
        None => Arc::new(LogNotifier),
    }
}

/// Sends in the background. Failures are logged and never reach the caller.
pub fn dispatch(notifier: Arc<dyn Notifier>, messages: Vec<Notification>) {
    if messages.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for message in messages {
            let to = message.to.clone();
            if let Err(e) = notifier.send(message).await {
                tracing::warn!(%to, error = %e, "notification failed");
            }
        }
    });
}

fn when(appointment: &Appointment) -> String {
    appointment
        .start_time
        .format("%A %d %B %Y at %H:%M")
        .to_string()
}

pub fn booking_received(
    org: &Organization,
    service: &Service,
    appointment: &Appointment,
) -> Notification {
    Notification {
        to: appointment.customer.email.clone(),
        subject: format!("Your booking with {} was received", org.name),
        body: format!(
            "Hi {},\n\nWe received your booking for {} on {}.\nStatus: {}.\n\n\
             Keep this reference to view or cancel your booking: {}\n",
            appointment.customer.name,
            service.name,
            when(appointment),
            appointment.status,
            appointment.cancellation_handle,
        ),
    }
}

pub fn new_booking_alert(
    org: &Organization,
    service: &Service,
    appointment: &Appointment,
) -> Option<Notification> {
    let to = org.contact_email.clone()?;
    let phone = appointment.customer.phone.as_deref().unwrap_or("-");
    Some(Notification {
        to,
        subject: format!("New booking: {} on {}", service.name, when(appointment)),
        body: format!(
            "{} <{}> (phone {}) booked {} on {}.\nStatus: {}.\n",
            appointment.customer.name,
            appointment.customer.email,
            phone,
            service.name,
            when(appointment),
            appointment.status,
        ),
    })
}

pub fn status_changed(org: &Organization, appointment: &Appointment) -> Notification {
    let (subject, line) = match appointment.status {
        AppointmentStatus::Confirmed => (
            format!("Your booking with {} is confirmed", org.name),
            "has been confirmed. See you then!",
        ),
        AppointmentStatus::Pending => (
            format!("Your booking with {} is pending again", org.name),
            "was moved back to pending. The business will contact you shortly.",
        ),
    };
    Notification {
        to: appointment.customer.email.clone(),
        subject,
        body: format!(
            "Hi {},\n\nYour booking on {} {}\n",
            appointment.customer.name,
            when(appointment),
            line
        ),
    }
}

pub fn cancellation_alert(org: &Organization, appointment: &Appointment) -> Option<Notification> {
    let to = org.contact_email.clone()?;
    Some(Notification {
        to,
        subject: format!("Booking cancelled: {}", when(appointment)),
        body: format!(
            "{} <{}> cancelled the booking on {}. The slot is free again.\n",
            appointment.customer.name,
            appointment.customer.email,
            when(appointment),
        ),
    })
}

pub fn cancelled_by_business(org: &Organization, appointment: &Appointment) -> Notification {
    Notification {
        to: appointment.customer.email.clone(),
        subject: format!("Your booking with {} was cancelled", org.name),
        body: format!(
            "Hi {},\n\n{} cancelled your booking on {}. Please pick a new time if you still need one.\n",
            appointment.customer.name,
            org.name,
            when(appointment),
        ),
    }
}

pub fn reminder(org: &Organization, appointment: &Appointment) -> Notification {
    Notification {
        to: appointment.customer.email.clone(),
        subject: format!("Reminder: your booking with {}", org.name),
        body: format!(
            "Hi {},\n\nThis is a reminder of your booking on {}.\n\
             To cancel, use your reference: {}\n",
            appointment.customer.name,
            when(appointment),
            appointment.cancellation_handle,
        ),
    }
}
