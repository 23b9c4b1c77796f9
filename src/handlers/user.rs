//! User endpoints: list, read, add, edit, delete, favorites.

use super::{parse_id, user_payload};
use crate::error::AppError;
use crate::response::{message, success_many, success_one, success_one_ok};
use crate::service::{MutationService, QueryService};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

#[utoipa::path(get, path = "/users", tag = "users",
    responses((status = 200, description = "All users, passwords omitted")))]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = QueryService::list_users(&state.store).await?;
    Ok(success_many(users))
}

#[utoipa::path(get, path = "/users/{user_id}", tag = "users",
    params(("user_id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "No such user")
    ))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("user", &id_str)?;
    let user = QueryService::get_user(&state.store, id).await?;
    Ok(success_one_ok(user))
}

#[utoipa::path(post, path = "/adduser", tag = "users",
    request_body = crate::model::UserPayload,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing or invalid field")
    ))]
pub async fn add_user(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = user_payload(body.ok_or_else(AppError::missing_body)?)?;
    let user = MutationService::add_user(&state.store, payload).await?;
    Ok(success_one(user))
}

#[utoipa::path(put, path = "/edituser/{user_id}", tag = "users",
    params(("user_id" = i32, Path, description = "User id")),
    request_body = crate::model::UserPayload,
    responses(
        (status = 200, description = "User updated; omitted fields keep their values"),
        (status = 400, description = "Missing body or invalid field"),
        (status = 404, description = "No such user")
    ))]
pub async fn edit_user(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Option<Json<Value>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("user", &id_str)?;
    let payload = body.map(user_payload).transpose()?;
    let user = MutationService::edit_user(&state.store, id, payload).await?;
    Ok(success_one_ok(user))
}

#[utoipa::path(delete, path = "/users/{user_id}", tag = "users",
    params(("user_id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User and its favorites deleted"),
        (status = 404, description = "No such user")
    ))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("user", &id_str)?;
    MutationService::delete_user(&state.store, id).await?;
    Ok(message(format!("user {} deleted", id)))
}

#[utoipa::path(get, path = "/users/{user_id}/favorites", tag = "favorites",
    params(("user_id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Favorite characters, planets and starships", body = crate::model::UserFavorites),
        (status = 404, description = "No such user")
    ))]
pub async fn user_favorites(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("user", &id_str)?;
    let favorites = QueryService::user_favorites(&state.store, id).await?;
    Ok(success_one_ok(favorites))
}

#[utoipa::path(get, path = "/users/{user_id}/favorites/edges", tag = "favorites",
    params(("user_id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Favorite edges grouped by kind", body = crate::model::FavoriteEdges),
        (status = 404, description = "No such user")
    ))]
pub async fn user_favorite_edges(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id("user", &id_str)?;
    let edges = QueryService::favorite_edges(&state.store, id).await?;
    Ok(success_one_ok(edges))
}
