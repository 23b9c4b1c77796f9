//! Common routes: sitemap, health, readiness, version, OpenAPI document.

use crate::doc::ApiDoc;
use crate::routes::api::ENDPOINTS;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::OpenApi;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

#[derive(Serialize)]
struct SitemapEntry {
    path: &'static str,
    methods: Vec<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (axum::http::StatusCode, Json<ReadyBody>)> {
    let store = &state.store;
    if let Err(e) = store.bounded(store.store().ping()).await {
        tracing::warn!(error = %e, "readiness check failed");
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn sitemap() -> Json<serde_json::Value> {
    let endpoints: Vec<SitemapEntry> = ENDPOINTS
        .iter()
        .map(|&(path, methods)| SitemapEntry {
            path,
            methods: methods.split(',').collect(),
        })
        .collect();
    Json(serde_json::json!({ "data": endpoints }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Common routes (no state): GET /, /health, /version, /openapi.json.
pub fn common_routes() -> Router {
    Router::new()
        .route("/", get(sitemap))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/openapi.json", get(openapi))
}

/// Common routes including readiness with a store check.
pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
        .merge(common_routes())
}
