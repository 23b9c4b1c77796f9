//! OpenAPI document served at `/openapi.json`.

use crate::model::{
    Character, Entity, FavoriteEdge, FavoriteEdges, FavoriteKind, Planet, Starship, User, UserFavorites, UserPayload,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Star Wars favorites API",
        description = "Characters, planets, starships, users and their favorites."
    ),
    paths(
        crate::handlers::catalogue::list_characters,
        crate::handlers::catalogue::get_character,
        crate::handlers::catalogue::list_planets,
        crate::handlers::catalogue::get_planet,
        crate::handlers::catalogue::list_starships,
        crate::handlers::catalogue::get_starship,
        crate::handlers::user::list_users,
        crate::handlers::user::get_user,
        crate::handlers::user::add_user,
        crate::handlers::user::edit_user,
        crate::handlers::user::delete_user,
        crate::handlers::user::user_favorites,
        crate::handlers::user::user_favorite_edges,
        crate::handlers::favorite::add_favorite,
        crate::handlers::favorite::remove_favorite,
    ),
    components(schemas(
        Character,
        Planet,
        Starship,
        Entity,
        User,
        UserPayload,
        FavoriteKind,
        FavoriteEdge,
        FavoriteEdges,
        UserFavorites
    )),
    tags(
        (name = "catalogue", description = "Pre-seeded characters, planets and starships"),
        (name = "users", description = "User records"),
        (name = "favorites", description = "User favorite edges")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_favorite_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/favorite/{kind}/{entity_id}/user/{user_id}"));
        assert!(doc.paths.paths.contains_key("/users/{user_id}/favorites"));
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("FavoriteEdge"));
        assert!(schemas.contains_key("UserFavorites"));
    }
}
