use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let store_ok = state.scheduler.store.ping().await.is_ok();

    let status = if store_ok { "healthy" } else { "degraded" };
    Json(json!({
        "status": status,
        "storage": store_ok,
        "timestamp": chrono::Utc::now(),
    }))
}
