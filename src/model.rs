//! Domain records: users, catalogue entities and favorite edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::AppError;

pub type UserId = i32;
pub type EntityId = i32;

/// A registered user. `password` is kept as received and never serialized.
#[derive(Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fields of a user that passed creation validation. Only `service::validation` builds these.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Overwrite the fields present in the patch.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
    }
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Raw JSON body for user create/edit. JSON `null` counts as absent.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct UserPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub height: Option<String>,
    pub mass: Option<String>,
    pub hair_color: Option<String>,
    pub skin_color: Option<String>,
    pub eye_color: Option<String>,
    pub birth_year: Option<String>,
    pub gender: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Planet {
    pub id: EntityId,
    pub name: String,
    pub climate: Option<String>,
    pub terrain: Option<String>,
    pub population: Option<String>,
    pub diameter: Option<String>,
    pub rotation_period: Option<String>,
    pub orbital_period: Option<String>,
    pub gravity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Starship {
    pub id: EntityId,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub starship_class: Option<String>,
    pub cost_in_credits: Option<String>,
    pub length: Option<String>,
    pub crew: Option<String>,
    pub passengers: Option<String>,
}

/// Any catalogue record. Serializes as the inner record's flat projection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Entity {
    Character(Character),
    Planet(Planet),
    Starship(Starship),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Character(c) => c.id,
            Entity::Planet(p) => p.id,
            Entity::Starship(s) => s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Character(c) => &c.name,
            Entity::Planet(p) => &p.name,
            Entity::Starship(s) => &s.name,
        }
    }

    pub fn kind(&self) -> FavoriteKind {
        match self {
            Entity::Character(_) => FavoriteKind::Character,
            Entity::Planet(_) => FavoriteKind::Planet,
            Entity::Starship(_) => FavoriteKind::Starship,
        }
    }
}

/// Which catalogue table an entity or favorite edge belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Character,
    Planet,
    Starship,
}

impl FavoriteKind {
    pub const ALL: [FavoriteKind; 3] = [FavoriteKind::Character, FavoriteKind::Planet, FavoriteKind::Starship];

    pub fn as_str(self) -> &'static str {
        match self {
            FavoriteKind::Character => "character",
            FavoriteKind::Planet => "planet",
            FavoriteKind::Starship => "starship",
        }
    }

    /// Entity table name.
    pub fn table(self) -> &'static str {
        match self {
            FavoriteKind::Character => "characters",
            FavoriteKind::Planet => "planets",
            FavoriteKind::Starship => "starships",
        }
    }

    /// Join table holding (user_id, entity column) pairs.
    pub fn edge_table(self) -> &'static str {
        match self {
            FavoriteKind::Character => "favorite_characters",
            FavoriteKind::Planet => "favorite_planets",
            FavoriteKind::Starship => "favorite_starships",
        }
    }

    /// Foreign key column in the join table.
    pub fn edge_column(self) -> &'static str {
        match self {
            FavoriteKind::Character => "character_id",
            FavoriteKind::Planet => "planet_id",
            FavoriteKind::Starship => "starship_id",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FavoriteKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "character" | "characters" => Ok(FavoriteKind::Character),
            "planet" | "planets" => Ok(FavoriteKind::Planet),
            "starship" | "starships" => Ok(FavoriteKind::Starship),
            _ => Err(AppError::NotFound(format!(
                "unknown favorite kind: {} (expected character, planet or starship)",
                s
            ))),
        }
    }
}

/// A "like" from a user to one catalogue entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct FavoriteEdge {
    pub kind: FavoriteKind,
    pub user_id: UserId,
    pub entity_id: EntityId,
    pub created_at: DateTime<Utc>,
}

/// Edges of one user split by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FavoriteEdges {
    pub characters: Vec<FavoriteEdge>,
    pub planets: Vec<FavoriteEdge>,
    pub starships: Vec<FavoriteEdge>,
}

impl FavoriteEdges {
    pub fn group(edges: Vec<FavoriteEdge>) -> Self {
        let mut out = FavoriteEdges::default();
        for edge in edges {
            match edge.kind {
                FavoriteKind::Character => out.characters.push(edge),
                FavoriteKind::Planet => out.planets.push(edge),
                FavoriteKind::Starship => out.starships.push(edge),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.characters.len() + self.planets.len() + self.starships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Favorite entities of one user, resolved to their projections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserFavorites {
    pub characters: Vec<Entity>,
    pub planets: Vec<Entity>,
    pub starships: Vec<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(kind: FavoriteKind, entity_id: EntityId) -> FavoriteEdge {
        FavoriteEdge {
            kind,
            user_id: 1,
            entity_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn user_projection_omits_password() {
        let user = User {
            id: 7,
            name: "Leia".into(),
            email: "leia@alderaan.gov".into(),
            password: "hope".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "name": "Leia", "email": "leia@alderaan.gov"}));
        assert!(!format!("{:?}", user).contains("hope"));
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut user = User {
            id: 1,
            name: "Luke".into(),
            email: "luke@rebels.org".into(),
            password: "x".into(),
        };
        UserPatch {
            email: Some("luke@jedi.org".into()),
            ..Default::default()
        }
        .apply(&mut user);
        assert_eq!(user.name, "Luke");
        assert_eq!(user.email, "luke@jedi.org");
        assert_eq!(user.password, "x");
    }

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!("planet".parse::<FavoriteKind>().unwrap(), FavoriteKind::Planet);
        assert_eq!("Starships".parse::<FavoriteKind>().unwrap(), FavoriteKind::Starship);
        assert!(matches!("droid".parse::<FavoriteKind>(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn edges_group_by_kind() {
        let grouped = FavoriteEdges::group(vec![
            edge(FavoriteKind::Planet, 1),
            edge(FavoriteKind::Character, 4),
            edge(FavoriteKind::Planet, 2),
        ]);
        assert_eq!(grouped.planets.len(), 2);
        assert_eq!(grouped.characters.len(), 1);
        assert!(grouped.starships.is_empty());
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn entity_serializes_flat() {
        let planet = Entity::Planet(Planet {
            id: 1,
            name: "Tatooine".into(),
            climate: Some("arid".into()),
            terrain: None,
            population: None,
            diameter: None,
            rotation_period: None,
            orbital_period: None,
            gravity: None,
        });
        let json = serde_json::to_value(&planet).unwrap();
        assert_eq!(json["name"], "Tatooine");
        assert_eq!(json["climate"], "arid");
        assert_eq!(planet.kind(), FavoriteKind::Planet);
    }
}
