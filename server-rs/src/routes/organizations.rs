use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Public profile of an organization with the services visitors can book.
pub async fn get_org(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    let store = &state.scheduler.store;
    let org = store
        .organization_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    let services = store.services(org.id).await?;

    Ok(Json(json!({
        "organization": org,
        "services": services,
    })))
}
