use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{BookingChannel, ReservationReceipt, ReservationRequest};
use crate::scheduling::interval::parse_start_time;
use crate::scheduling::reservation::{BookingView, ReservationInput};
use crate::AppState;

pub async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<ReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationReceipt>)> {
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
            BookingChannel::Public,
            None,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<BookingView>> {
    Ok(Json(state.scheduler.booking_by_handle(&handle).await?))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<Value>> {
    state.scheduler.cancel_by_handle(&handle).await?;
    Ok(Json(json!({ "success": true })))
}
