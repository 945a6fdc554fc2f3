use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use welcome_api::{
    auth::RemoteAuthVerifier,
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache, PgStore},
    routes::{create_router, AppState},
    services::{
        providers::{GoogleMapsProvider, OpenAiGenerator},
        RecommendationPipeline,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(PgStore::new(pool));

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, writer) = Cache::new(create_redis_client(redis_url)?);
            tracing::info!("Redis cache enabled");
            (cache, Some(writer))
        }
        None => {
            tracing::warn!("REDIS_URL not set, running without cache");
            (Cache::disabled(), None)
        }
    };

    let maps = Arc::new(
        GoogleMapsProvider::new(
            cache.clone(),
            config.google_maps_api_key.clone(),
            config.google_maps_api_url.clone(),
            timeout,
        )
        .context("Failed to build Google Maps client")?,
    );
    let generator = Arc::new(
        OpenAiGenerator::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            timeout,
        )
        .context("Failed to build text generation client")?,
    );
    let auth = Arc::new(
        RemoteAuthVerifier::new(config.auth_url.clone(), config.auth_api_key.clone(), timeout)
            .context("Failed to build auth client")?,
    );

    let pipeline = RecommendationPipeline::new(
        maps.clone(),
        maps.clone(),
        generator,
        store.clone(),
        config.recommendation_regeneration,
    );

    let state = Arc::new(AppState::new(
        store.clone(),
        store.clone(),
        store,
        cache,
        pipeline,
        maps,
        auth,
    ));

    let app = create_router(state).layer(CorsLayer::permissive());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!(
        address = %bind_addr,
        regeneration = ?config.recommendation_regeneration,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
