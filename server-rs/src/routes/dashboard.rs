use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::auth::{owned_organization, AuthOwner};
use crate::models::{
    Appointment, BookingChannel, ReservationReceipt, ReservationRequest, StatusUpdateRequest,
};
use crate::scheduling::interval::{parse_date, parse_start_time};
use crate::scheduling::reservation::ReservationInput;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: String,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Value>> {
    let org = owned_organization(&state, &owner).await?;
    let date = parse_date(&query.date)?;
    let appointments = state.scheduler.day_schedule(&org, date).await?;
    Ok(Json(json!({ "date": date, "appointments": appointments })))
}

/// Owner-entered booking. Skips payment review, so it starts confirmed.
pub async fn create_manual(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Json(body): Json<ReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationReceipt>)> {
    let org = owned_organization(&state, &owner).await?;
    let start = parse_start_time(&body.start_time)?;
    let receipt = state
        .scheduler
        .reserve(
            ReservationInput {
                service_id: body.service_id,
                start,
                customer: body.customer,
                payment_proof_url: body.payment_proof_url,
            },
            BookingChannel::Manual,
            Some(org.id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> AppResult<Json<Appointment>> {
    let org = owned_organization(&state, &owner).await?;
    let updated = state.scheduler.set_status(&org, id, body.status).await?;
    Ok(Json(updated))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let org = owned_organization(&state, &owner).await?;
    state.scheduler.cancel_by_owner(&org, id).await?;
    Ok(Json(json!({ "success": true })))
}
