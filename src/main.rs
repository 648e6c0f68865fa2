use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use cinema_guru::{
    api::{create_router, AppState},
    config::{AuthMode, Config},
    db::{self, CacheWriterHandle, CatalogStore, MemoryCatalogStore, PgCatalogStore},
    services::{GithubIdentityProvider, HeaderIdentityProvider, IdentityProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinema_guru=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = build_store(&config).await?;
    if config.seed_catalog {
        db::seed::seed_if_empty(store.as_ref()).await?;
    }

    let (identity, cache_writer) = build_identity(&config).await?;
    tracing::info!(provider = identity.name(), "Identity provider ready");

    let state = AppState::new(
        store,
        identity,
        config.page_size,
        config.activity_page_size,
    );
    let app = create_router(state, config.cors_allowed_origin.as_deref());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL catalog");
            Ok(Arc::new(PgCatalogStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, catalog is kept in memory");
            Ok(Arc::new(MemoryCatalogStore::new()))
        }
    }
}

async fn build_identity(
    config: &Config,
) -> anyhow::Result<(Arc<dyn IdentityProvider>, Option<CacheWriterHandle>)> {
    match config.auth_mode {
        AuthMode::Github => {
            let client = db::create_redis_client(&config.redis_url)?;
            let (cache, handle) = db::Cache::connect(client)
                .await
                .context("failed to connect to Redis")?;
            let provider = GithubIdentityProvider::new(
                cache,
                config.github_api_url.clone(),
                config.identity_cache_ttl,
            );
            Ok((Arc::new(provider), Some(handle)))
        }
        AuthMode::Header => {
            let provider = HeaderIdentityProvider::new(&config.auth_header)?;
            Ok((Arc::new(provider), None))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
