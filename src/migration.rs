//! Startup DDL: entity tables, favorite join tables, optional catalogue seed.
//! Every statement is idempotent so the bootstrap can run on each start.

use crate::error::{AppError, ConfigError};
use crate::model::FavoriteKind;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const ENTITY_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        height TEXT,
        mass TEXT,
        hair_color TEXT,
        skin_color TEXT,
        eye_color TEXT,
        birth_year TEXT,
        gender TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS planets (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        climate TEXT,
        terrain TEXT,
        population TEXT,
        diameter TEXT,
        rotation_period TEXT,
        orbital_period TEXT,
        gravity TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS starships (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        model TEXT,
        manufacturer TEXT,
        starship_class TEXT,
        cost_in_credits TEXT,
        length TEXT,
        crew TEXT,
        passengers TEXT
    )
    "#,
];

/// DDL for one favorite join table. The composite key makes (user, entity) unique per kind;
/// both foreign keys cascade so deleting either endpoint removes the edge.
fn edge_table_ddl(kind: FavoriteKind) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {edge} (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            {col} INTEGER NOT NULL REFERENCES {table}(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, {col})
        )
        "#,
        edge = kind.edge_table(),
        col = kind.edge_column(),
        table = kind.table(),
    )
}

/// Create the four entity tables and three favorite tables if they do not exist.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in ENTITY_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    for kind in FavoriteKind::ALL {
        sqlx::query(&edge_table_ddl(kind)).execute(pool).await?;
    }
    tracing::info!("tables ensured");
    Ok(())
}

/// Insert a small fixed catalogue. Existing rows (matched by name) are left alone.
pub async fn seed_catalogue(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for &(name, height, mass, hair, skin, eyes, born, gender) in SEED_CHARACTERS {
        sqlx::query(
            "INSERT INTO characters (name, height, mass, hair_color, skin_color, eye_color, birth_year, gender) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(height)
        .bind(mass)
        .bind(hair)
        .bind(skin)
        .bind(eyes)
        .bind(born)
        .bind(gender)
        .execute(&mut *tx)
        .await?;
    }
    for &(name, climate, terrain, population, diameter, rotation, orbital, gravity) in SEED_PLANETS {
        sqlx::query(
            "INSERT INTO planets (name, climate, terrain, population, diameter, rotation_period, orbital_period, gravity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(climate)
        .bind(terrain)
        .bind(population)
        .bind(diameter)
        .bind(rotation)
        .bind(orbital)
        .bind(gravity)
        .execute(&mut *tx)
        .await?;
    }
    for &(name, model, manufacturer, class, cost, length, crew, passengers) in SEED_STARSHIPS {
        sqlx::query(
            "INSERT INTO starships (name, model, manufacturer, starship_class, cost_in_credits, length, crew, passengers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(model)
        .bind(manufacturer)
        .bind(class)
        .bind(cost)
        .bind(length)
        .bind(crew)
        .bind(passengers)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    tracing::info!(
        characters = SEED_CHARACTERS.len(),
        planets = SEED_PLANETS.len(),
        starships = SEED_STARSHIPS.len(),
        "catalogue seeded"
    );
    Ok(())
}

type Row8 = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

pub(crate) const SEED_CHARACTERS: &[Row8] = &[
    ("Luke Skywalker", "172", "77", "blond", "fair", "blue", "19BBY", "male"),
    ("C-3PO", "167", "75", "n/a", "gold", "yellow", "112BBY", "n/a"),
    ("Darth Vader", "202", "136", "none", "white", "yellow", "41.9BBY", "male"),
    ("Leia Organa", "150", "49", "brown", "light", "brown", "19BBY", "female"),
];

pub(crate) const SEED_PLANETS: &[Row8] = &[
    ("Tatooine", "arid", "desert", "200000", "10465", "23", "304", "1 standard"),
    ("Alderaan", "temperate", "grasslands, mountains", "2000000000", "12500", "24", "364", "1 standard"),
    ("Hoth", "frozen", "tundra, ice caves, mountain ranges", "unknown", "7200", "23", "549", "1.1 standard"),
];

pub(crate) const SEED_STARSHIPS: &[Row8] = &[
    ("Millennium Falcon", "YT-1300 light freighter", "Corellian Engineering Corporation", "Light freighter", "100000", "34.37", "4", "6"),
    ("X-wing", "T-65 X-wing", "Incom Corporation", "Starfighter", "149999", "12.5", "1", "0"),
    ("Death Star", "DS-1 Orbital Battle Station", "Imperial Department of Military Research", "Deep Space Mobile Battlestation", "1000000000000", "120000", "342953", "843342"),
];

/// Make sure the database named in `database_url` exists, creating it through the `postgres`
/// maintenance database when it does not. Best effort: when the maintenance database cannot be
/// reached the step is skipped and the pool connect that follows decides.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = maintenance_options(database_url)?;
    let Some(db_name) = db_name else {
        return Ok(());
    };
    if let Err(e) = create_database_if_missing(admin, &db_name).await {
        tracing::warn!(database = %db_name, error = %e, "could not ensure database exists; continuing");
    }
    Ok(())
}

/// Split a connection URL into options for the `postgres` maintenance database and the
/// target database name. `None` when the URL names no database or names `postgres` itself.
fn maintenance_options(database_url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
    let db_name = opts
        .get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(String::from);
    Ok((opts.database("postgres"), db_name))
}

async fn create_database_if_missing(admin: PgConnectOptions, db_name: &str) -> Result<(), AppError> {
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_options_target_postgres_database() {
        let (admin, name) = maintenance_options("postgres://u:p@localhost:5432/starwars?sslmode=disable").unwrap();
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
        assert_eq!(name.as_deref(), Some("starwars"));
    }

    #[test]
    fn query_values_with_slashes_do_not_leak_into_database_name() {
        let (admin, name) = maintenance_options(
            "postgres://u:p@db.example.com:5432/starwars?sslmode=verify-full&sslrootcert=/etc/ssl/ca.pem",
        )
        .unwrap();
        assert_eq!(name.as_deref(), Some("starwars"));
        assert_eq!(admin.get_host(), "db.example.com");
        assert_eq!(admin.get_database(), Some("postgres"));
    }

    #[test]
    fn url_without_database_keeps_its_host() {
        let (admin, name) = maintenance_options("postgres://localhost").unwrap();
        assert_eq!(admin.get_host(), "localhost");
        assert_ne!(name.as_deref(), Some("localhost"));
    }

    #[test]
    fn malformed_url_is_a_config_error() {
        let err = maintenance_options("not a url").unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidDatabaseUrl(_))));
    }

    #[test]
    fn edge_ddl_cascades_both_endpoints() {
        let ddl = edge_table_ddl(FavoriteKind::Planet);
        assert!(ddl.contains("favorite_planets"));
        assert!(ddl.contains("planet_id INTEGER NOT NULL REFERENCES planets(id) ON DELETE CASCADE"));
        assert!(ddl.contains("PRIMARY KEY (user_id, planet_id)"));
    }

    #[test]
    fn quoted_identifiers_double_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
