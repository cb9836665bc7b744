use tracing_subscriber::EnvFilter;

use watchrec_api::{
    api::{create_router, AppState},
    config::Config,
    data::DataPaths,
    services::{RecommendationService, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    // Fit before accepting traffic; a failed load is reported through /ready
    let paths = DataPaths::from_raw_dir(&config.data_raw_dir);
    tracing::info!(data_dir = %config.data_raw_dir.display(), "Loading catalog and events");
    let service = RecommendationService::from_load(Recommender::load(
        &paths,
        config.watch_exclude_threshold,
    ));

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(?err, "Failed to listen for shutdown signal"),
    }
}
