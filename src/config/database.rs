//! Configuración de base de datos
//!
//! Conexión y tamaño del pool de PostgreSQL con SQLx.

use std::env;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use super::environment::ConfigError;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    /// Lee `DATABASE_URL`, `DB_MAX_CONNECTIONS` y `DB_MIN_CONNECTIONS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut config = Self::new(url);

        if let Some(value) = lookup("DB_MAX_CONNECTIONS") {
            config.max_connections = parse_count("DB_MAX_CONNECTIONS", value)?;
        }
        if let Some(value) = lookup("DB_MIN_CONNECTIONS") {
            config.min_connections = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "DB_MIN_CONNECTIONS",
                value,
                expected: "a non-negative integer",
            })?;
        }
        if config.min_connections > config.max_connections {
            return Err(ConfigError::InvalidValue {
                name: "DB_MIN_CONNECTIONS",
                value: config.min_connections.to_string(),
                expected: "a value not greater than DB_MAX_CONNECTIONS",
            });
        }

        Ok(config)
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

fn parse_count(name: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            name,
            value,
            expected: "a positive integer",
        }),
    }
}
