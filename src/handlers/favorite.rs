//! Favorite edge endpoints: POST and DELETE /favorite/:kind/:entity_id/user/:user_id.

use super::parse_id;
use crate::error::AppError;
use crate::model::FavoriteKind;
use crate::response::{message, success_one};
use crate::service::MutationService;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

fn parse_target(kind: &str, entity: &str, user: &str) -> Result<(FavoriteKind, i32, i32), AppError> {
    let kind: FavoriteKind = kind.parse()?;
    Ok((kind, parse_id(kind.as_str(), entity)?, parse_id("user", user)?))
}

#[utoipa::path(post, path = "/favorite/{kind}/{entity_id}/user/{user_id}", tag = "favorites",
    params(
        ("kind" = crate::model::FavoriteKind, Path, description = "character, planet or starship"),
        ("entity_id" = i32, Path, description = "Entity id"),
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 201, description = "Favorite added", body = crate::model::FavoriteEdge),
        (status = 404, description = "User or entity missing"),
        (status = 409, description = "Already a favorite")
    ))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Path((kind, entity_str, user_str)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (kind, entity_id, user_id) = parse_target(&kind, &entity_str, &user_str)?;
    let edge = MutationService::add_favorite(&state.store, kind, user_id, entity_id).await?;
    Ok(success_one(edge))
}

#[utoipa::path(delete, path = "/favorite/{kind}/{entity_id}/user/{user_id}", tag = "favorites",
    params(
        ("kind" = crate::model::FavoriteKind, Path, description = "character, planet or starship"),
        ("entity_id" = i32, Path, description = "Entity id"),
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Favorite removed"),
        (status = 404, description = "User, entity or favorite missing")
    ))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((kind, entity_str, user_str)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (kind, entity_id, user_id) = parse_target(&kind, &entity_str, &user_str)?;
    MutationService::remove_favorite(&state.store, kind, user_id, entity_id).await?;
    Ok(message(format!(
        "{} {} removed from favorites of user {}",
        kind, entity_id, user_id
    )))
}
