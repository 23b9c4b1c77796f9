//! Catalogue, user and favorite routes.

use crate::handlers::catalogue::{
    get_character, get_planet, get_starship, list_characters, list_planets, list_starships,
};
use crate::handlers::favorite::{add_favorite, remove_favorite};
use crate::handlers::user::{
    add_user, delete_user, edit_user, get_user, list_users, user_favorite_edges, user_favorites,
};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

/// Every route as (path, methods), in registration order. Served by the sitemap at `/`.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("/characters", "GET"),
    ("/characters/:character_id", "GET"),
    ("/planets", "GET"),
    ("/planets/:planet_id", "GET"),
    ("/starships", "GET"),
    ("/starships/:starship_id", "GET"),
    ("/users", "GET,POST"),
    ("/users/:user_id", "GET,PATCH,DELETE"),
    ("/users/:user_id/favorites", "GET"),
    ("/users/:user_id/favorites/edges", "GET"),
    ("/adduser", "POST"),
    ("/edituser/:user_id", "PUT"),
    ("/favorite/:kind/:entity_id/user/:user_id", "POST,DELETE"),
];

pub fn api_routes(state: AppState) -> Router {
    for (path, methods) in ENDPOINTS {
        tracing::debug!("Registering route {} [{}]", path, methods);
    }
    Router::new()
        .route("/characters", get(list_characters))
        .route("/characters/:character_id", get(get_character))
        .route("/planets", get(list_planets))
        .route("/planets/:planet_id", get(get_planet))
        .route("/starships", get(list_starships))
        .route("/starships/:starship_id", get(get_starship))
        .route("/users", get(list_users).post(add_user))
        .route("/users/:user_id", get(get_user).patch(edit_user).delete(delete_user))
        .route("/users/:user_id/favorites", get(user_favorites))
        .route("/users/:user_id/favorites/edges", get(user_favorite_edges))
        .route("/adduser", post(add_user))
        .route("/edituser/:user_id", put(edit_user))
        .route(
            "/favorite/:kind/:entity_id/user/:user_id",
            post(add_favorite).delete(remove_favorite),
        )
        .with_state(state)
}
