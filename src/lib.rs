//! Star Wars favorites API: catalogue entities, users and their favorite edges over PostgreSQL.

pub mod config;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use migration::{ensure_database_exists, ensure_tables, seed_catalogue};
pub use routes::{api_routes, common_routes, common_routes_with_ready};
pub use service::{MutationService, QueryService};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store, StoreHandle, StoreTx};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router: common routes, API routes, CORS, body limit and request tracing.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(api_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
