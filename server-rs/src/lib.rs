use axum::{
    middleware as axum_mw,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduling;
pub mod services;
pub mod store;

use config::Config;
use middleware::rate_limit::RateLimiter;
use scheduling::Scheduler;
use services::stripe_service::StripeWebhooks;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scheduler: Scheduler,
    pub stripe: Option<StripeWebhooks>,
    pub rate_limiter: RateLimiter,
    pub booking_rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, scheduler: Scheduler) -> Self {
        let stripe = StripeWebhooks::new(&config.stripe);
        let rate_limiter =
            RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs);
        let booking_rate_limiter =
            RateLimiter::new(config.rate_limit.booking_max, config.rate_limit.window_secs);
        Self {
            config: Arc::new(config),
            scheduler,
            stripe,
            rate_limiter,
            booking_rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- Public booking flow (no auth) ---
    let org_routes = Router::new().route("/:slug", get(routes::organizations::get_org));

    let availability_routes =
        Router::new().route("/", get(routes::availability::get_availability));

    let booking_routes = Router::new()
        .route(
            "/",
            post(routes::bookings::create_booking).layer(axum_mw::from_fn_with_state(
                state.clone(),
                middleware::rate_limit::booking_rate_limit,
            )),
        )
        .route(
            "/:handle",
            get(routes::bookings::get_booking).delete(routes::bookings::cancel_booking),
        );

    // --- Owner dashboard ---
    let dashboard_routes = Router::new()
        .route(
            "/appointments",
            get(routes::dashboard::list_appointments).post(routes::dashboard::create_manual),
        )
        .route(
            "/appointments/:id",
            axum::routing::delete(routes::dashboard::cancel_appointment),
        )
        .route(
            "/appointments/:id/status",
            patch(routes::dashboard::set_status),
        )
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    // --- Webhook routes (raw body, no auth) ---
    let webhook_routes = Router::new().route("/stripe", post(routes::webhooks::stripe_webhook));

    let internal_routes =
        Router::new().route("/reminders", post(routes::internal::run_reminders));

    // --- Compose full API ---
    let api = Router::new()
        .nest("/organizations", org_routes)
        .nest("/availability", availability_routes)
        .nest("/bookings", booking_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/webhooks", webhook_routes)
        .nest("/internal", internal_routes);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health::health))
        // Global middleware
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
