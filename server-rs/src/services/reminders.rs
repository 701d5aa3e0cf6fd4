use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Organization;
use crate::scheduling::interval::TimeRange;
use crate::scheduling::Scheduler;
use crate::services::notifications;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ReminderReport {
    pub sent: u32,
    pub failed: u32,
}

/// Reminds customers whose appointment starts within `lead` from now.
///
/// Runs once per call. An appointment is flagged only after its reminder was
/// delivered, so failures are retried on the next sweep.
pub async fn send_due_reminders(scheduler: &Scheduler, lead: Duration) -> AppResult<ReminderReport> {
    let now = scheduler.clock.now();
    let window = TimeRange::starting_at(now, lead)?;
    let due = scheduler.store.reminders_due(window).await?;

    let mut organizations: HashMap<Uuid, Option<Organization>> = HashMap::new();
    let mut report = ReminderReport::default();

    for appointment in due {
        let organization = match organizations.get(&appointment.organization_id) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = scheduler
                    .store
                    .organization(appointment.organization_id)
                    .await?;
                organizations.insert(appointment.organization_id, fetched.clone());
                fetched
            }
        };
        let Some(organization) = organization else {
            continue;
        };

        let message = notifications::reminder(&organization, &appointment);
        match scheduler.notifier.send(message).await {
            Ok(()) => {
                scheduler
                    .store
                    .mark_reminder_sent(organization.id, appointment.id)
                    .await?;
                report.sent += 1;
            }
            Err(e) => {
                tracing::warn!(
                    organization_id = %organization.id,
                    appointment_id = %appointment.id,
                    error = %e,
                    "reminder failed"
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(sent = report.sent, failed = report.failed, "reminder sweep finished");
    Ok(report)
}
