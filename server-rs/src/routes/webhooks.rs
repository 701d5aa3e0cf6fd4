use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::services::subscription_sync;
use crate::AppState;

pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    let stripe = match &state.stripe {
        Some(s) => s,
        None => return Ok(StatusCode::OK),
    };

    let sig = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let event = match stripe.verify_webhook_signature(&body, sig) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Rejected Stripe webhook: {e}");
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let event_id = event["id"].as_str().unwrap_or("");
    let event_type = event["type"].as_str().unwrap_or("");

    let result = match event_type {
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            let sub = &event["data"]["object"];
            subscription_sync::sync_from_stripe(state.scheduler.store.as_ref(), sub).await
        }
        _ => Ok(()),
    };

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            tracing::error!(event_id, event_type, "Stripe webhook processing failed: {e}");
            // Non-2xx makes Stripe redeliver the event.
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
