//! Persistence port. A `Store` hands out per-request transactions; every read and write
//! goes through a `StoreTx`, which is committed by the caller or rolled back on drop.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{Entity, EntityId, FavoriteEdge, FavoriteKind, NewUser, User, UserId, UserPatch};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction scoped to one request.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError>;

    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn get_entity(&mut self, kind: FavoriteKind, id: EntityId) -> Result<Option<Entity>, AppError>;

    /// All entities of one kind, ordered by id.
    async fn list_entities(&mut self, kind: FavoriteKind) -> Result<Vec<Entity>, AppError>;

    async fn get_user(&mut self, id: UserId) -> Result<Option<User>, AppError>;

    async fn list_users(&mut self) -> Result<Vec<User>, AppError>;

    async fn insert_user(&mut self, user: NewUser) -> Result<User, AppError>;

    /// Overwrite the fields present in `patch`. `None` when the user does not exist.
    async fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<Option<User>, AppError>;

    /// Delete a user and all of its favorite edges. `false` when the user does not exist.
    async fn delete_user(&mut self, id: UserId) -> Result<bool, AppError>;

    /// Insert one edge. A duplicate (user, entity) pair for the kind is a `Conflict`.
    async fn insert_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<FavoriteEdge, AppError>;

    async fn find_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<Option<FavoriteEdge>, AppError>;

    /// `false` when no such edge exists.
    async fn delete_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<bool, AppError>;

    /// Every edge owned by the user, all kinds, oldest first.
    async fn list_favorites(&mut self, user_id: UserId) -> Result<Vec<FavoriteEdge>, AppError>;

    /// Entities the user marked as favorite for one kind, in edge creation order.
    async fn favorite_entities(&mut self, kind: FavoriteKind, user_id: UserId) -> Result<Vec<Entity>, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

/// Shared store plus the per-operation deadline applied at the store boundary.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        StoreHandle { store, timeout }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Run `op` under the deadline. On expiry the future (and any open transaction) is dropped.
    pub async fn bounded<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "store operation timed out");
                Err(AppError::StoreUnavailable(format!(
                    "store did not respond within {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}
