use axum::{extract::State, http::HeaderMap, Json};
use chrono::Duration;

use crate::error::{AppError, AppResult};
use crate::services::reminders::{self, ReminderReport};
use crate::AppState;

const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Reminder sweep, triggered by an external scheduler.
pub async fn run_reminders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ReminderReport>> {
    let expected = &state.config.cron_secret;
    let supplied = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if expected.is_empty() || supplied != expected {
        return Err(AppError::Unauthorized("Invalid cron secret".into()));
    }

    let lead = Duration::seconds(state.config.scheduling.reminder_lead_secs);
    let report = reminders::send_due_reminders(&state.scheduler, lead).await?;
    Ok(Json(report))
}
