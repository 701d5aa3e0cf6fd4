use std::net::SocketAddr;
use std::sync::Arc;

use slot_booking::config::Config;
use slot_booking::scheduling::clock::SystemClock;
use slot_booking::scheduling::{Scheduler, SlotPolicy};
use slot_booking::services::notifications;
use slot_booking::store::PgStore;
use slot_booking::{build_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let policy = SlotPolicy::from_config(&config.scheduling);
    let scheduler = Scheduler::new(
        Arc::new(PgStore::new(pool)),
        notifications::notifier_from_config(&config.mail),
        Arc::new(SystemClock),
        policy,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        env = %config.app_env,
        buffer_minutes = config.scheduling.buffer_minutes,
        "slot booking API starting"
    );

    let state = AppState::new(config, scheduler);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
