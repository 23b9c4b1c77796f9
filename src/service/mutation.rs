//! Validated writes. Every operation commits once at the end; any earlier error drops the
//! transaction so nothing is applied.

use super::query::{require_entity, require_user};
use super::validation::RequestValidator;
use crate::error::AppError;
use crate::model::{EntityId, FavoriteEdge, FavoriteKind, User, UserId, UserPayload};
use crate::store::StoreHandle;

pub struct MutationService;

impl MutationService {
    pub async fn add_user(store: &StoreHandle, payload: UserPayload) -> Result<User, AppError> {
        let new_user = RequestValidator::validate_new(payload)?;
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                let user = tx.insert_user(new_user).await?;
                tx.commit().await?;
                tracing::info!(user_id = user.id, "user created");
                Ok(user)
            })
            .await
    }

    /// Overwrites only the fields present in `payload`. The user is looked up before the
    /// body is examined, so an unknown id is `NotFound` even without a body.
    pub async fn edit_user(
        store: &StoreHandle,
        id: UserId,
        payload: Option<UserPayload>,
    ) -> Result<User, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                let current = require_user(tx.as_mut(), id).await?;
                let payload = payload.ok_or_else(AppError::missing_body)?;
                let patch = RequestValidator::validate_patch(payload)?;
                if patch.is_empty() {
                    return Ok(current);
                }
                let user = tx
                    .update_user(id, patch)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("user {} does not exist", id)))?;
                tx.commit().await?;
                tracing::info!(user_id = id, "user updated");
                Ok(user)
            })
            .await
    }

    /// Deletes the user together with all of its favorites.
    pub async fn delete_user(store: &StoreHandle, id: UserId) -> Result<(), AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                if !tx.delete_user(id).await? {
                    return Err(AppError::NotFound(format!("user {} does not exist", id)));
                }
                tx.commit().await?;
                tracing::info!(user_id = id, "user deleted");
                Ok(())
            })
            .await
    }

    /// Both endpoints must exist; an existing edge for the same pair is a `Conflict`.
    pub async fn add_favorite(
        store: &StoreHandle,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<FavoriteEdge, AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_user(tx.as_mut(), user_id).await?;
                let entity = require_entity(tx.as_mut(), kind, entity_id).await?;
                if tx.find_favorite(kind, user_id, entity_id).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "{} '{}' is already a favorite of user {}",
                        kind,
                        entity.name(),
                        user_id
                    )));
                }
                let edge = tx.insert_favorite(kind, user_id, entity_id).await?;
                tx.commit().await?;
                tracing::info!(%kind, user_id, entity_id, "favorite added");
                Ok(edge)
            })
            .await
    }

    /// Fails with `NotFound` when the user, the entity, or the edge itself is missing.
    pub async fn remove_favorite(
        store: &StoreHandle,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<(), AppError> {
        store
            .bounded(async {
                let mut tx = store.store().begin().await?;
                require_user(tx.as_mut(), user_id).await?;
                require_entity(tx.as_mut(), kind, entity_id).await?;
                if !tx.delete_favorite(kind, user_id, entity_id).await? {
                    return Err(AppError::NotFound(format!(
                        "user {} has no favorite {} {}",
                        user_id, kind, entity_id
                    )));
                }
                tx.commit().await?;
                tracing::info!(%kind, user_id, entity_id, "favorite removed");
                Ok(())
            })
            .await
    }
}
