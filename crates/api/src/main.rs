//! CriptoAPI server binary entrypoint.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cripto_common::config::AppConfig;
use cripto_common::db::{create_pool, run_migrations};
use cripto_engine::dataset::Dataset;
use cripto_engine::store::QueryStore;

use cripto_api::routes::create_router;
use cripto_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("cripto_api=debug,cripto_engine=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting CriptoAPI server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Select the store: PostgreSQL when configured, otherwise the dataset file
    let store = match (&config.database_url, &config.dataset_path) {
        (Some(database_url), _) => {
            let pool = create_pool(database_url, config.db_max_connections).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            QueryStore::Postgres(pool)
        }
        (None, Some(path)) => QueryStore::memory(Dataset::load(path).await?),
        (None, None) => anyhow::bail!("No query store configured"),
    };
    tracing::info!(store = store.kind(), "Query store ready");

    // Build application state
    let state = AppState::new(store, config.query_defaults);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    tracing::info!("API server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
