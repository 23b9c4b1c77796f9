use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use starwars_api::{app, AppState, MemoryStore, StoreHandle};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn seeded_app() -> Router {
    let store = StoreHandle::new(Arc::new(MemoryStore::seeded().await), Duration::from_secs(5));
    app(AppState::new(store), 64 * 1024)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn add_luke(app: &Router) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/adduser",
        Some(json!({"name": "Luke", "email": "luke@rebels.org", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn luke_favorites_tatooine_over_http() {
    let app = seeded_app().await;
    let user_id = add_luke(&app).await;

    let (status, body) = call(&app, Method::POST, &format!("/favorite/planet/1/user/{}", user_id), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["kind"], "planet");
    assert_eq!(body["data"]["entity_id"], 1);

    let (status, body) = call(&app, Method::GET, &format!("/users/{}/favorites", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let planets = body["data"]["planets"].as_array().unwrap();
    assert_eq!(planets.len(), 1);
    assert_eq!(planets[0]["name"], "Tatooine");
    assert_eq!(body["data"]["characters"], json!([]));
    assert_eq!(body["data"]["starships"], json!([]));
}

#[tokio::test]
async fn missing_character_is_404_with_error_body() {
    let store = StoreHandle::new(Arc::new(MemoryStore::new()), Duration::from_secs(5));
    let app = app(AppState::new(store), 1024);
    let (status, body) = call(&app, Method::GET, "/characters/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("character 9999"));
}

#[tokio::test]
async fn lists_use_count_envelope_and_hide_passwords() {
    let app = seeded_app().await;
    add_luke(&app).await;

    let (status, body) = call(&app, Method::GET, "/characters", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 4);
    assert_eq!(body["data"][0]["name"], "Luke Skywalker");

    let (_, body) = call(&app, Method::GET, "/users", None).await;
    assert_eq!(body["meta"]["count"], 1);
    assert!(body["data"][0].get("password").is_none());
}

#[tokio::test]
async fn add_user_validation_is_400() {
    let app = seeded_app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/adduser",
        Some(json!({"name": "Luke", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "validation: email is required");

    let (status, _) = call(&app, Method::POST, "/adduser", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&app, Method::GET, "/users", None).await;
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn edit_user_only_touches_supplied_fields() {
    let app = seeded_app().await;
    let user_id = add_luke(&app).await;

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/edituser/{}", user_id),
        Some(json!({"email": "luke@jedi.org"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Luke");
    assert_eq!(body["data"]["email"], "luke@jedi.org");

    let (status, _) = call(&app, Method::PUT, "/edituser/404", Some(json!({"name": "Ben"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_without_body_reports_missing_user_first() {
    let app = seeded_app().await;
    let (status, body) = call(&app, Method::PUT, "/edituser/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let user_id = add_luke(&app).await;
    let (status, body) = call(&app, Method::PUT, &format!("/edituser/{}", user_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn duplicate_favorite_is_409_and_removal_of_absent_edge_is_404() {
    let app = seeded_app().await;
    let user_id = add_luke(&app).await;
    let uri = format!("/favorite/character/3/user/{}", user_id);

    let (status, _) = call(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, _) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("no favorite"));

    let (_, body) = call(&app, Method::GET, &format!("/users/{}/favorites/edges", user_id), None).await;
    assert_eq!(body["data"]["characters"], json!([]));
}

#[tokio::test]
async fn bad_path_segments_are_rejected() {
    let app = seeded_app().await;
    let user_id = add_luke(&app).await;

    let (status, _) = call(&app, Method::POST, &format!("/favorite/droid/1/user/{}", user_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, Method::GET, "/planets/tatooine", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    let (status, _) = call(&app, Method::POST, "/favorite/starship/99/user/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_user_removes_favorites() {
    let app = seeded_app().await;
    let user_id = add_luke(&app).await;
    call(&app, Method::POST, &format!("/favorite/starship/1/user/{}", user_id), None).await;

    let (status, _) = call(&app, Method::DELETE, &format!("/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &format!("/users/{}/favorites", user_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_checks_and_sitemap_respond() {
    let app = seeded_app().await;
    let (status, body) = call(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (status, body) = call(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap().to_string())
        .collect();
    assert!(paths.contains(&"/favorite/:kind/:entity_id/user/:user_id".to_string()));

    let (status, body) = call(&app, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/characters").is_some());
}
