use crate::error::AppResult;
use crate::models::SubscriptionStatus;
use crate::store::Store;

/// Maps a Stripe subscription status onto the organization lifecycle.
pub fn status_from_stripe(stripe_status: &str) -> SubscriptionStatus {
    match stripe_status {
        "trialing" => SubscriptionStatus::Trial,
        "active" => SubscriptionStatus::Active,
        _ => SubscriptionStatus::Inactive,
    }
}

pub async fn sync_from_stripe(store: &dyn Store, stripe_sub: &serde_json::Value) -> AppResult<()> {
    let stripe_customer_id = stripe_sub["customer"].as_str().unwrap_or("");
    let stripe_status = stripe_sub["status"].as_str().unwrap_or("unknown");

    if stripe_customer_id.is_empty() {
        tracing::warn!("Stripe subscription event without customer id");
        return Ok(());
    }

    let status = status_from_stripe(stripe_status);
    match store
        .set_subscription_status(stripe_customer_id, status)
        .await?
    {
        Some(org_id) => {
            tracing::info!(
                organization_id = %org_id,
                %status,
                stripe_status,
                "subscription status synced"
            );
        }
        None => {
            tracing::warn!(
                "No organization found for stripe customer {}",
                stripe_customer_id
            );
        }
    }
    Ok(())
}
