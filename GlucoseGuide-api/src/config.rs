//! Process configuration read from the environment (and `.env` via dotenv).

use std::env;
use std::str::FromStr;

use glucose_guide_data::database::DatabaseConfig;
use tracing::warn;

/// Default allowed origins for browser clients
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3005";

/// Where measurements are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite file through the r2d2 pool
    Sqlite,
    /// Process memory, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" | "in-memory" | "in_memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unsupported storage backend: {}", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    /// Stage name reported by the health check
    pub environment: String,
    /// Build identifier reported by the health check
    pub version_hash: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            storage: StorageBackend::Sqlite,
            database: DatabaseConfig::default(),
            environment: "local".to_string(),
            version_hash: "latest".to_string(),
            cors_allowed_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid PORT {:?}, using {}", raw, defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>().unwrap_or_else(|e| {
                warn!("{}, using sqlite", e);
                defaults.storage
            }),
            Err(_) => defaults.storage,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            port,
            storage,
            database: DatabaseConfig::from_env(),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
            version_hash: env::var("API_VERSION_HASH").unwrap_or(defaults.version_hash),
            cors_allowed_origins,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
