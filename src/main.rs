use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use hos_planner::api;
use hos_planner::config::Config;
use hos_planner::error::AppError;
use hos_planner::geo::{CatalogProvider, LocationCatalog};
use hos_planner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let mut catalog = LocationCatalog::with_builtin();
    if let Some(path) = &config.locations_file {
        let loaded = catalog
            .load_json_file(path)
            .map_err(|err| AppError::Internal(err.to_string()))?;
        tracing::info!(path = %path.display(), loaded, "custom locations loaded");
    }
    let provider = Arc::new(CatalogProvider::new(catalog, config.road_factor));

    let shared_state = Arc::new(AppState::new(
        provider,
        config.rules.clone(),
        config.default_log_context.clone(),
        config.home_offset()?,
        config.event_buffer_size,
    ));

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        cycle_rule = %config.rules.cycle_rule,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
