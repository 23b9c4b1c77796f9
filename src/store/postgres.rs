//! PostgreSQL store. Each `StoreTx` wraps one `sqlx::Transaction`; dropping it uncommitted rolls back.

use super::{Store, StoreTx};
use crate::error::AppError;
use crate::model::{
    Character, Entity, EntityId, FavoriteEdge, FavoriteKind, NewUser, Planet, Starship, User, UserId, UserPatch,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

const CHARACTER_COLUMNS: &str = "id, name, height, mass, hair_color, skin_color, eye_color, birth_year, gender";
const PLANET_COLUMNS: &str =
    "id, name, climate, terrain, population, diameter, rotation_period, orbital_period, gravity";
const STARSHIP_COLUMNS: &str =
    "id, name, model, manufacturer, starship_class, cost_in_credits, length, crew, passengers";

fn entity_columns(kind: FavoriteKind) -> &'static str {
    match kind {
        FavoriteKind::Character => CHARACTER_COLUMNS,
        FavoriteKind::Planet => PLANET_COLUMNS,
        FavoriteKind::Starship => STARSHIP_COLUMNS,
    }
}

/// Columns qualified with the `e.` alias used in favorite joins.
fn aliased_columns(kind: FavoriteKind) -> String {
    entity_columns(kind)
        .split(", ")
        .map(|c| format!("e.{}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct EdgeRow {
    kind: String,
    user_id: UserId,
    entity_id: EntityId,
    created_at: DateTime<Utc>,
}

impl EdgeRow {
    fn into_edge(self) -> Result<FavoriteEdge, AppError> {
        Ok(FavoriteEdge {
            kind: self.kind.parse()?,
            user_id: self.user_id,
            entity_id: self.entity_id,
            created_at: self.created_at,
        })
    }
}

/// Constraint violations on edge insert become domain errors; anything else stays a store failure.
fn map_edge_insert_error(err: sqlx::Error, kind: FavoriteKind, user_id: UserId, entity_id: EntityId) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(format!(
                "user {} already has {} {} as favorite",
                user_id, kind, entity_id
            ));
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound(format!("user {} or {} {}", user_id, kind, entity_id));
        }
    }
    AppError::Db(err)
}

impl PgTx {
    async fn fetch_entities(&mut self, kind: FavoriteKind, sql: &str, bind: Option<i32>) -> Result<Vec<Entity>, AppError> {
        tracing::debug!(sql = %sql, param = ?bind, "query");
        let conn = &mut *self.tx;
        Ok(match kind {
            FavoriteKind::Character => {
                let mut q = sqlx::query_as::<_, Character>(sql);
                if let Some(v) = bind {
                    q = q.bind(v);
                }
                q.fetch_all(conn).await?.into_iter().map(Entity::Character).collect()
            }
            FavoriteKind::Planet => {
                let mut q = sqlx::query_as::<_, Planet>(sql);
                if let Some(v) = bind {
                    q = q.bind(v);
                }
                q.fetch_all(conn).await?.into_iter().map(Entity::Planet).collect()
            }
            FavoriteKind::Starship => {
                let mut q = sqlx::query_as::<_, Starship>(sql);
                if let Some(v) = bind {
                    q = q.bind(v);
                }
                q.fetch_all(conn).await?.into_iter().map(Entity::Starship).collect()
            }
        })
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn get_entity(&mut self, kind: FavoriteKind, id: EntityId) -> Result<Option<Entity>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", entity_columns(kind), kind.table());
        let rows = self.fetch_entities(kind, &sql, Some(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_entities(&mut self, kind: FavoriteKind) -> Result<Vec<Entity>, AppError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", entity_columns(kind), kind.table());
        self.fetch_entities(kind, &sql, None).await
    }

    async fn get_user(&mut self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(users)
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id, name, email, password",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             password = COALESCE($4, password) WHERE id = $1 RETURNING id, name, email, password",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.password)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool, AppError> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<FavoriteEdge, AppError> {
        let sql = format!(
            "INSERT INTO {edge} (user_id, {col}) VALUES ($1, $2) \
             RETURNING '{kind}'::text AS kind, user_id, {col} AS entity_id, created_at",
            edge = kind.edge_table(),
            col = kind.edge_column(),
            kind = kind.as_str(),
        );
        tracing::debug!(sql = %sql, user_id, entity_id, "query");
        let row = sqlx::query_as::<_, EdgeRow>(&sql)
            .bind(user_id)
            .bind(entity_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_edge_insert_error(e, kind, user_id, entity_id))?;
        row.into_edge()
    }

    async fn find_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<Option<FavoriteEdge>, AppError> {
        let sql = format!(
            "SELECT '{kind}'::text AS kind, user_id, {col} AS entity_id, created_at \
             FROM {edge} WHERE user_id = $1 AND {col} = $2",
            edge = kind.edge_table(),
            col = kind.edge_column(),
            kind = kind.as_str(),
        );
        let row = sqlx::query_as::<_, EdgeRow>(&sql)
            .bind(user_id)
            .bind(entity_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(EdgeRow::into_edge).transpose()
    }

    async fn delete_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
            kind.edge_table(),
            kind.edge_column()
        );
        let done = sqlx::query(&sql)
            .bind(user_id)
            .bind(entity_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_favorites(&mut self, user_id: UserId) -> Result<Vec<FavoriteEdge>, AppError> {
        let sql = FavoriteKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "SELECT '{}'::text AS kind, user_id, {} AS entity_id, created_at FROM {} WHERE user_id = $1",
                    kind.as_str(),
                    kind.edge_column(),
                    kind.edge_table()
                )
            })
            .collect::<Vec<_>>()
            .join(" UNION ALL ")
            + " ORDER BY created_at, kind, entity_id";
        tracing::debug!(sql = %sql, user_id, "query");
        let rows = sqlx::query_as::<_, EdgeRow>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(EdgeRow::into_edge).collect()
    }

    async fn favorite_entities(&mut self, kind: FavoriteKind, user_id: UserId) -> Result<Vec<Entity>, AppError> {
        let sql = format!(
            "SELECT {cols} FROM {table} e JOIN {edge} f ON f.{col} = e.id \
             WHERE f.user_id = $1 ORDER BY f.created_at, e.id",
            cols = aliased_columns(kind),
            table = kind.table(),
            edge = kind.edge_table(),
            col = kind.edge_column(),
        );
        self.fetch_entities(kind, &sql, Some(user_id)).await
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
