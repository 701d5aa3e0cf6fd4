use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::scheduling::availability::DayAvailability;
use crate::scheduling::interval::parse_date;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "serviceId")]
    pub service_id: Uuid,
    #[serde(rename = "organizationId")]
    pub organization_id: Option<Uuid>,
    pub date: String,
}

pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<DayAvailability>> {
    let date = parse_date(&query.date)?;
    let availability = state
        .scheduler
        .availability(query.organization_id, query.service_id, date)
        .await?;
    Ok(Json(availability))
}
