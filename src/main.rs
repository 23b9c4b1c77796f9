//! Server binary: loads settings, prepares the store, mounts all routes.

use starwars_api::{
    app, ensure_database_exists, ensure_tables, seed_catalogue, AppState, MemoryStore, PgStore, Settings, Store,
    StoreBackend, StoreHandle,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("starwars_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let store: Arc<dyn Store> = match settings.store_backend {
        StoreBackend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.db_max_connections)
                .acquire_timeout(settings.store_timeout)
                .connect(&settings.database_url)
                .await?;
            ensure_tables(&pool).await?;
            if settings.seed_catalogue {
                seed_catalogue(&pool).await?;
            }
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            if settings.seed_catalogue {
                Arc::new(MemoryStore::seeded().await)
            } else {
                Arc::new(MemoryStore::new())
            }
        }
    };

    let state = AppState::new(StoreHandle::new(store, settings.store_timeout));
    let router = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(settings.bind_addr()?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
