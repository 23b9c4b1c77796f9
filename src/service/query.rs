//! Read-only operations. Each call runs in its own transaction, which is dropped unused.

use crate::error::AppError;
use crate::model::{Entity, EntityId, FavoriteEdges, FavoriteKind, User, UserFavorites, UserId};
use crate::store::{StoreHandle, StoreTx};

pub struct QueryService;

impl QueryService {
    pub async fn list_entities(store: &StoreHandle, kind: FavoriteKind) -> Result<Vec<Entity>, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                tx.list_entities(kind).await
            })
            .await
    }

    pub async fn get_entity(store: &StoreHandle, kind: FavoriteKind, id: EntityId) -> Result<Entity, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_entity(tx.as_mut(), kind, id).await
            })
            .await
    }

    pub async fn list_users(store: &StoreHandle) -> Result<Vec<User>, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                tx.list_users().await
            })
            .await
    }

    pub async fn get_user(store: &StoreHandle, id: UserId) -> Result<User, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_user(tx.as_mut(), id).await
            })
            .await
    }

    /// Favorite entities of a user grouped by kind.
    pub async fn user_favorites(store: &StoreHandle, user_id: UserId) -> Result<UserFavorites, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_user(tx.as_mut(), user_id).await?;
                Ok(UserFavorites {
                    characters: tx.favorite_entities(FavoriteKind::Character, user_id).await?,
                    planets: tx.favorite_entities(FavoriteKind::Planet, user_id).await?,
                    starships: tx.favorite_entities(FavoriteKind::Starship, user_id).await?,
                })
            })
            .await
    }

    /// Raw favorite edges of a user grouped by kind.
    pub async fn favorite_edges(store: &StoreHandle, user_id: UserId) -> Result<FavoriteEdges, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_user(tx.as_mut(), user_id).await?;
                Ok(FavoriteEdges::group(tx.list_favorites(user_id).await?))
            })
            .await
    }
}

pub(crate) async fn require_user(tx: &mut dyn StoreTx, id: UserId) -> Result<User, AppError> {
    tx.get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} does not exist", id)))
}

pub(crate) async fn require_entity(tx: &mut dyn StoreTx, kind: FavoriteKind, id: EntityId) -> Result<Entity, AppError> {
    tx.get_entity(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} does not exist", kind, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn handle(store: MemoryStore) -> StoreHandle {
        StoreHandle::new(Arc::new(store), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn missing_character_is_not_found_on_empty_store() {
        let store = handle(MemoryStore::new());
        let err = QueryService::get_entity(&store, FavoriteKind::Character, 9999).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "character 9999 does not exist"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lists_are_ordered_by_id() {
        let store = handle(MemoryStore::seeded().await);
        let planets = QueryService::list_entities(&store, FavoriteKind::Planet).await.unwrap();
        let ids: Vec<_> = planets.iter().map(Entity::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(QueryService::list_users(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn favorites_of_unknown_user_is_not_found() {
        let store = handle(MemoryStore::seeded().await);
        assert!(matches!(
            QueryService::user_favorites(&store, 42).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            QueryService::favorite_edges(&store, 42).await,
            Err(AppError::NotFound(_))
        ));
    }
}
