use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_finder::{
    config::Config,
    db,
    routes::{create_router, AppState},
    services::{maintenance, TvMazeClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_finder=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        catalog_api_url = %config.catalog_api_url,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database_url).await?;
    let catalog = Arc::new(TvMazeClient::from_config(&config)?);

    let state = Arc::new(AppState::new(pool, catalog, config.cache_max_age()));

    let eviction = maintenance::spawn_periodic_eviction(
        state.cache.clone(),
        config.cache_max_age(),
        config.cache_eviction_interval(),
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eviction.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
