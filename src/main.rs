use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use taxigo::api;
use taxigo::config::{Config, LogFormat};
use taxigo::error::AppError;
use taxigo::map::loader::{MapLoader, StaticDirFetcher};
use taxigo::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let app_state = AppState::new(&config)?;
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    let loader = MapLoader::new(config.map_resources.clone(), config.map_init_delay());
    let fetcher = StaticDirFetcher::new(config.static_dir.clone());
    let board = shared_state.map.clone();
    tokio::spawn(async move {
        if let Err(err) = loader.load(&board, &fetcher).await {
            tracing::error!(error = %err, "map unavailable for this session");
        }
    });

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        seed_demo_orders = config.seed_demo_orders,
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
