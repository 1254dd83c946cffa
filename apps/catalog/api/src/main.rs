use axum_helpers::server::{create_production_app, health_router};
use axum_helpers::{InMemoryTokenStore, RedisTokenStore, TokenStore};
use catalog_api::{AppState, Config, api, openapi};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let token_store: Arc<dyn TokenStore> = match &config.redis {
        Some(redis) => {
            let manager = database::redis::connect_from_config_with_retry(redis.clone(), None)
                .await
                .map_err(|e| eyre::eyre!("Redis connection failed: {}", e))?;
            Arc::new(RedisTokenStore::new(manager))
        }
        None => {
            warn!("REDIS_URL not set, active tokens are kept in memory and lost on restart");
            Arc::new(InMemoryTokenStore::new())
        }
    };

    let state = AppState::new(config, db, token_store);

    // create_router nests our routes under /api and adds docs/middleware
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state))?;

    // - /health: liveness check with app name/version
    // - /ready: database and token store checks
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting catalog API with graceful shutdown (30s timeout)");

    // The cleanup future owns the pool; the listener only needs the address
    let server_config = state.config.server.clone();
    let db = state.db.clone();

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
