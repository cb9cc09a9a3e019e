use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tracing::info;

use surf_lamp_core::api::routes;
use surf_lamp_core::config::Settings;
use surf_lamp_core::fetcher::Fetcher;
use surf_lamp_core::registry::Registry;
use surf_lamp_core::repository::Repository;
use surf_lamp_core::scheduler::Scheduler;
use surf_lamp_core::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(settings.log_level.clone()))
        .init();

    info!("starting surf-lamp-core v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(Registry::new(Registry::default_locations()));
    if registry.is_empty() {
        eprintln!("configuration error: location registry is empty");
        std::process::exit(1);
    }

    let repository = match Repository::connect(&settings.database_url).await {
        Ok(repo) => Arc::new(repo),
        Err(e) => {
            eprintln!("configuration error: failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    repository.migrate().await?;

    let fetcher = Arc::new(Fetcher::new(Duration::from_secs(settings.http_timeout_seconds)));

    let scheduler = Arc::new(Scheduler::new(
        registry.clone(),
        repository.clone(),
        fetcher,
        Duration::from_secs(settings.cycle_interval_seconds),
        settings.max_concurrent_fetches,
    ));

    let scheduler_handle = tokio::spawn(scheduler.clone().run());

    let state = Arc::new(AppState { registry, repository });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/arduino/{id}/data", get(routes::legacy_data))
        .route("/api/arduino/v2/{id}/data", get(routes::v2_data))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("surf-lamp-core listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await?;

    scheduler_handle.abort();

    Ok(())
}

async fn shutdown_signal(scheduler: Arc<Scheduler>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    scheduler.request_shutdown();
}
