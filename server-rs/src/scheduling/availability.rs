use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{weekday_of, BusinessHours, Organization, Service};
use crate::store::Store;

use super::clock::Clock;
use super::interval::TimeRange;
use super::{Scheduler, SlotPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Local wall-clock start, `HH:MM`.
    pub time: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub organization_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    /// No business hours are configured for this weekday.
    pub closed: bool,
    pub slots: Vec<Slot>,
}

/// Walks the opening window in steps of `slot_length`.
///
/// Only slots that end at or before closing time are emitted. A slot is
/// unavailable when it starts before `now` or intersects any `booked`
/// interval; unavailable slots are still returned, in chronological order.
pub fn generate_slots(
    hours: &BusinessHours,
    date: NaiveDate,
    slot_length: Duration,
    booked: &[TimeRange],
    now: NaiveDateTime,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if slot_length <= Duration::zero() {
        return slots;
    }

    let close = date.and_time(hours.close);
    let mut start = date.and_time(hours.open);
    while start + slot_length <= close {
        let candidate = TimeRange {
            start,
            end: start + slot_length,
        };
        let is_available =
            start >= now && !booked.iter().any(|b| candidate.overlaps(b));
        slots.push(Slot {
            time: start.format("%H:%M").to_string(),
            start: candidate.start,
            end: candidate.end,
            is_available,
        });
        start = candidate.end;
    }
    slots
}

/// Resolves a bookable service, optionally checking it belongs to
/// `organization_id`, together with its organization.
pub async fn resolve_service(
    store: &dyn Store,
    organization_id: Option<Uuid>,
    service_id: Uuid,
) -> AppResult<(Organization, Service)> {
    let service = store
        .service(service_id)
        .await?
        .filter(Service::is_bookable)
        .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

    if organization_id.is_some_and(|org| org != service.organization_id) {
        return Err(AppError::NotFound("Service not found".into()));
    }

    let organization = store
        .organization(service.organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    Ok((organization, service))
}

/// Bookable slots of one service on one calendar day.
pub async fn compute_slots(
    store: &dyn Store,
    clock: &dyn Clock,
    policy: &SlotPolicy,
    organization_id: Option<Uuid>,
    service_id: Uuid,
    date: NaiveDate,
) -> AppResult<DayAvailability> {
    let (organization, service) = resolve_service(store, organization_id, service_id).await?;
    let slot_length = policy.slot_length(&service);

    let hours = store
        .business_hours(organization.id, weekday_of(date))
        .await?;

    let Some(hours) = hours else {
        tracing::debug!(organization_id = %organization.id, %date, "closed on this weekday");
        return Ok(DayAvailability {
            organization_id: organization.id,
            service_id: service.id,
            date,
            closed: true,
            slots: Vec::new(),
        });
    };

    // One snapshot of the day's bookings; every slot is judged against it.
    let booked: Vec<TimeRange> = store
        .appointments_overlapping(organization.id, TimeRange::day(date))
        .await?
        .iter()
        .map(|a| a.interval())
        .collect();

    let slots = generate_slots(&hours, date, slot_length, &booked, clock.now());
    tracing::debug!(
        organization_id = %organization.id,
        service_id = %service.id,
        %date,
        slots = slots.len(),
        booked = booked.len(),
        "computed availability"
    );

    Ok(DayAvailability {
        organization_id: organization.id,
        service_id: service.id,
        date,
        closed: false,
        slots,
    })
}

impl Scheduler {
    pub async fn availability(
        &self,
        organization_id: Option<Uuid>,
        service_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<DayAvailability> {
        compute_slots(
            self.store.as_ref(),
            self.clock.as_ref(),
            &self.policy,
            organization_id,
            service_id,
            date,
        )
        .await
    }
}
