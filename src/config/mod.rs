//! Configuración del proyecto
//!
//! Variables de entorno del servidor y configuración de la base de datos.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::{ConfigError, Environment, EnvironmentConfig, StorageBackend};
