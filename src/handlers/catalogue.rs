//! Read-only catalogue endpoints: characters, planets, starships.

use super::parse_id;
use crate::error::AppError;
use crate::model::FavoriteKind;
use crate::response::{success_many, success_one_ok};
use crate::service::QueryService;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

async fn list(state: &AppState, kind: FavoriteKind) -> Result<impl IntoResponse, AppError> {
    let rows = QueryService::list_entities(&state.store, kind).await?;
    Ok(success_many(rows))
}

async fn read(state: &AppState, kind: FavoriteKind, id_str: &str) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(kind.as_str(), id_str)?;
    let row = QueryService::get_entity(&state.store, kind, id).await?;
    Ok(success_one_ok(row))
}

#[utoipa::path(get, path = "/characters", tag = "catalogue",
    responses((status = 200, description = "All characters")))]
pub async fn list_characters(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    list(&state, FavoriteKind::Character).await
}

#[utoipa::path(get, path = "/characters/{character_id}", tag = "catalogue",
    params(("character_id" = i32, Path, description = "Character id")),
    responses(
        (status = 200, description = "Character found"),
        (status = 404, description = "No such character")
    ))]
pub async fn get_character(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    read(&state, FavoriteKind::Character, &id_str).await
}

#[utoipa::path(get, path = "/planets", tag = "catalogue",
    responses((status = 200, description = "All planets")))]
pub async fn list_planets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    list(&state, FavoriteKind::Planet).await
}

#[utoipa::path(get, path = "/planets/{planet_id}", tag = "catalogue",
    params(("planet_id" = i32, Path, description = "Planet id")),
    responses(
        (status = 200, description = "Planet found"),
        (status = 404, description = "No such planet")
    ))]
pub async fn get_planet(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    read(&state, FavoriteKind::Planet, &id_str).await
}

#[utoipa::path(get, path = "/starships", tag = "catalogue",
    responses((status = 200, description = "All starships")))]
pub async fn list_starships(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    list(&state, FavoriteKind::Starship).await
}

#[utoipa::path(get, path = "/starships/{starship_id}", tag = "catalogue",
    params(("starship_id" = i32, Path, description = "Starship id")),
    responses(
        (status = 200, description = "Starship found"),
        (status = 404, description = "No such starship")
    ))]
pub async fn get_starship(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    read(&state, FavoriteKind::Starship, &id_str).await
}
