//! Configuración de variables de entorno
//!
//! Lee y valida la configuración del servidor. Todas las variables tienen un
//! valor por defecto razonable para desarrollo; un valor presente pero
//! inválido es un error de arranque.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Staging => "staging",
            Environment::Production => "prod",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// Dónde viven schedules, sustituciones, viajes y pasajeros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub log_level: Level,
    pub cors_origins: Vec<String>,
    pub storage_backend: StorageBackend,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: Level::INFO,
            cors_origins: Vec::new(),
            storage_backend: StorageBackend::Postgres,
        }
    }
}

impl EnvironmentConfig {
    /// Lee la configuración del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lee la configuración de una fuente arbitraria de variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("ENVIRONMENT") {
            Some(value) => parse(&value, "ENVIRONMENT", "dev, staging or prod")?,
            None => defaults.environment,
        };

        let port = match var("PORT") {
            Some(value) => match value.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(invalid("PORT", value, "a port number between 1 and 65535")),
            },
            None => defaults.port,
        };

        let log_level = match var("LOG_LEVEL") {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => return Err(invalid("LOG_LEVEL", value, "trace, debug, info, warn or error")),
            },
            None => defaults.log_level,
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => parse(&value, "STORAGE_BACKEND", "postgres or memory")?,
            None => defaults.storage_backend,
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment,
            host: var("HOST").unwrap_or(defaults.host),
            port,
            log_level,
            cors_origins,
            storage_backend,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Dirección de escucha `host:port`
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(value: &str, name: &'static str, expected: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(name, value.to_string(), expected))
}

fn invalid(name: &'static str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue { name, value, expected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<EnvironmentConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EnvironmentConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server_url(), "0.0.0.0:8080");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_reads_all_values() {
        let config = config_from(&[
            ("ENVIRONMENT", "prod"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("LOG_LEVEL", "DEBUG"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com,"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server_url(), "127.0.0.1:3000");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.cors_origins, vec!["https://a.example.com", "https://b.example.com"]);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("PORT", "0")]),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("ENVIRONMENT", "qa")]),
            Err(ConfigError::InvalidValue { name: "ENVIRONMENT", .. })
        ));
        assert!(matches!(
            config_from(&[("STORAGE_BACKEND", "redis")]),
            Err(ConfigError::InvalidValue { name: "STORAGE_BACKEND", .. })
        ));
        assert!(matches!(
            config_from(&[("LOG_LEVEL", "verbose")]),
            Err(ConfigError::InvalidValue { name: "LOG_LEVEL", .. })
        ));
    }
}
