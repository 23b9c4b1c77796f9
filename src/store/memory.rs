//! In-process store. A transaction holds the store lock and mutates a private copy,
//! which replaces the shared state only on commit.

use super::{Store, StoreTx};
use crate::error::AppError;
use crate::migration::{SEED_CHARACTERS, SEED_PLANETS, SEED_STARSHIPS};
use crate::model::{
    Character, Entity, EntityId, FavoriteEdge, FavoriteKind, NewUser, Planet, Starship, User, UserId, UserPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    characters: BTreeMap<EntityId, Character>,
    planets: BTreeMap<EntityId, Planet>,
    starships: BTreeMap<EntityId, Starship>,
    /// Insertion order is edge creation order.
    edges: Vec<FavoriteEdge>,
    last_user_id: UserId,
    last_entity_id: BTreeMap<FavoriteKind, EntityId>,
}

impl Tables {
    fn next_entity_id(&mut self, kind: FavoriteKind) -> EntityId {
        let id = self.last_entity_id.entry(kind).or_insert(0);
        *id += 1;
        *id
    }

    fn entity(&self, kind: FavoriteKind, id: EntityId) -> Option<Entity> {
        match kind {
            FavoriteKind::Character => self.characters.get(&id).cloned().map(Entity::Character),
            FavoriteKind::Planet => self.planets.get(&id).cloned().map(Entity::Planet),
            FavoriteKind::Starship => self.starships.get(&id).cloned().map(Entity::Starship),
        }
    }

    fn insert_entity(&mut self, entity: Entity) -> Entity {
        let id = self.next_entity_id(entity.kind());
        match entity {
            Entity::Character(mut c) => {
                c.id = id;
                self.characters.insert(id, c.clone());
                Entity::Character(c)
            }
            Entity::Planet(mut p) => {
                p.id = id;
                self.planets.insert(id, p.clone());
                Entity::Planet(p)
            }
            Entity::Starship(mut s) => {
                s.id = id;
                self.starships.insert(id, s.clone());
                Entity::Starship(s)
            }
        }
    }

    fn edge_position(&self, kind: FavoriteKind, user_id: UserId, entity_id: EntityId) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.kind == kind && e.user_id == user_id && e.entity_id == entity_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Store preloaded with the same catalogue `migration::seed_catalogue` writes, ids from 1.
    pub async fn seeded() -> Self {
        let store = MemoryStore::new();
        for &(name, height, mass, hair, skin, eyes, born, gender) in SEED_CHARACTERS {
            store
                .add_entity(Entity::Character(Character {
                    id: 0,
                    name: name.into(),
                    height: Some(height.into()),
                    mass: Some(mass.into()),
                    hair_color: Some(hair.into()),
                    skin_color: Some(skin.into()),
                    eye_color: Some(eyes.into()),
                    birth_year: Some(born.into()),
                    gender: Some(gender.into()),
                }))
                .await;
        }
        for &(name, climate, terrain, population, diameter, rotation, orbital, gravity) in SEED_PLANETS {
            store
                .add_entity(Entity::Planet(Planet {
                    id: 0,
                    name: name.into(),
                    climate: Some(climate.into()),
                    terrain: Some(terrain.into()),
                    population: Some(population.into()),
                    diameter: Some(diameter.into()),
                    rotation_period: Some(rotation.into()),
                    orbital_period: Some(orbital.into()),
                    gravity: Some(gravity.into()),
                }))
                .await;
        }
        for &(name, model, manufacturer, class, cost, length, crew, passengers) in SEED_STARSHIPS {
            store
                .add_entity(Entity::Starship(Starship {
                    id: 0,
                    name: name.into(),
                    model: Some(model.into()),
                    manufacturer: Some(manufacturer.into()),
                    starship_class: Some(class.into()),
                    cost_in_credits: Some(cost.into()),
                    length: Some(length.into()),
                    crew: Some(crew.into()),
                    passengers: Some(passengers.into()),
                }))
                .await;
        }
        store
    }

    /// Add a catalogue record outside any request; the store assigns its id.
    pub async fn add_entity(&self, entity: Entity) -> Entity {
        self.tables.lock().await.insert_entity(entity)
    }

    /// Remove a catalogue record and every edge pointing at it.
    #[cfg(test)]
    pub(crate) async fn remove_entity(&self, kind: FavoriteKind, id: EntityId) -> bool {
        let mut tables = self.tables.lock().await;
        let removed = match kind {
            FavoriteKind::Character => tables.characters.remove(&id).is_some(),
            FavoriteKind::Planet => tables.planets.remove(&id).is_some(),
            FavoriteKind::Starship => tables.starships.remove(&id).is_some(),
        };
        tables.edges.retain(|e| !(e.kind == kind && e.entity_id == id));
        removed
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.tables.lock().await.edges.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn get_entity(&mut self, kind: FavoriteKind, id: EntityId) -> Result<Option<Entity>, AppError> {
        Ok(self.working.entity(kind, id))
    }

    async fn list_entities(&mut self, kind: FavoriteKind) -> Result<Vec<Entity>, AppError> {
        let t = &self.working;
        Ok(match kind {
            FavoriteKind::Character => t.characters.values().cloned().map(Entity::Character).collect(),
            FavoriteKind::Planet => t.planets.values().cloned().map(Entity::Planet).collect(),
            FavoriteKind::Starship => t.starships.values().cloned().map(Entity::Starship).collect(),
        })
    }

    async fn get_user(&mut self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        Ok(self.working.users.values().cloned().collect())
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, AppError> {
        self.working.last_user_id += 1;
        let user = User {
            id: self.working.last_user_id,
            name: user.name,
            email: user.email,
            password: user.password,
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<Option<User>, AppError> {
        Ok(self.working.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&mut self, id: UserId) -> Result<bool, AppError> {
        let removed = self.working.users.remove(&id).is_some();
        self.working.edges.retain(|e| e.user_id != id);
        Ok(removed)
    }

    async fn insert_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<FavoriteEdge, AppError> {
        if !self.working.users.contains_key(&user_id) || self.working.entity(kind, entity_id).is_none() {
            return Err(AppError::NotFound(format!("user {} or {} {}", user_id, kind, entity_id)));
        }
        if self.working.edge_position(kind, user_id, entity_id).is_some() {
            return Err(AppError::Conflict(format!(
                "user {} already has {} {} as favorite",
                user_id, kind, entity_id
            )));
        }
        let edge = FavoriteEdge {
            kind,
            user_id,
            entity_id,
            created_at: Utc::now(),
        };
        self.working.edges.push(edge.clone());
        Ok(edge)
    }

    async fn find_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<Option<FavoriteEdge>, AppError> {
        Ok(self
            .working
            .edge_position(kind, user_id, entity_id)
            .map(|i| self.working.edges[i].clone()))
    }

    async fn delete_favorite(
        &mut self,
        kind: FavoriteKind,
        user_id: UserId,
        entity_id: EntityId,
    ) -> Result<bool, AppError> {
        match self.working.edge_position(kind, user_id, entity_id) {
            Some(i) => {
                self.working.edges.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_favorites(&mut self, user_id: UserId) -> Result<Vec<FavoriteEdge>, AppError> {
        Ok(self
            .working
            .edges
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn favorite_entities(&mut self, kind: FavoriteKind, user_id: UserId) -> Result<Vec<Entity>, AppError> {
        let t = &self.working;
        Ok(t.edges
            .iter()
            .filter(|e| e.kind == kind && e.user_id == user_id)
            .filter_map(|e| t.entity(kind, e.entity_id))
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
