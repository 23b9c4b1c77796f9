//! Process settings read from the environment (after `.env` is loaded by `main`).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/starwars";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub store_backend: StoreBackend,
    pub seed_catalogue: bool,
    pub body_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let store_backend = match lookup("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => StoreBackend::Postgres,
        };
        let timeout_ms: u64 = parse_or(&lookup, "STORE_TIMEOUT_MS", 5000)?;
        Ok(Settings {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            store_timeout: Duration::from_millis(timeout_ms),
            store_backend,
            seed_catalogue: parse_bool(&lookup, "SEED_CATALOGUE")?,
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", 64 * 1024)?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                value: self.host.clone(),
            })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if ["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(true),
        Some(v) if ["0", "false", "no", "off"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            key,
            value: v.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.port, 3000);
        assert_eq!(s.store_timeout, Duration::from_millis(5000));
        assert_eq!(s.store_backend, StoreBackend::Postgres);
        assert!(!s.seed_catalogue);
        assert_eq!(s.bind_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides_are_parsed() {
        let s = settings(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "memory"),
            ("SEED_CATALOGUE", "TRUE"),
            ("STORE_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(s.port, 8080);
        assert_eq!(s.store_backend, StoreBackend::Memory);
        assert!(s.seed_catalogue);
        assert_eq!(s.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            settings(&[("PORT", "lots")]),
            Err(ConfigError::InvalidValue { key: "PORT", .. })
        ));
        assert!(matches!(settings(&[("STORE_BACKEND", "redis")]), Err(ConfigError::UnknownBackend(_))));
        assert!(matches!(
            settings(&[("SEED_CATALOGUE", "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
