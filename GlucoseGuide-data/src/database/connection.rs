//! Database connection module for the GlucoseGuide application
//!
//! Measurements are persisted in SQLite through an r2d2 connection pool.
//! The pool is built once at start-up and handed to each store; there is no
//! process-wide pool.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Default directory for the SQLite file
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default SQLite file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "glucose_guide.db";

/// Database connection pool
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<r2d2::Pool<SqliteConnectionManager>>),
}

/// Database configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: format!("{}/{}", DEFAULT_DATA_DIR, DEFAULT_DB_FILE),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let sqlite_path = env::var("DB_SQLITE_PATH")
            .unwrap_or_else(|_| format!("{}/{}", data_dir.trim_end_matches('/'), DEFAULT_DB_FILE));

        let max_connections = parse_env("DB_MAX_CONNECTIONS", 10u32);
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", 30u64);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        }
    }
}

fn parse_env<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            warn!("Invalid value for {}: {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

impl DatabasePool {
    /// Open (or create) the SQLite file named by `config` and run migrations
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.max_connections == 0 {
            return Err(DatabaseError::ConfigError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        info!("Initializing SQLite database at: {}", config.sqlite_path);

        if let Some(parent) = Path::new(&config.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConfigError(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(&config.sqlite_path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

        let pool = r2d2::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)?;

        let pool = DatabasePool::SQLite(Arc::new(pool));
        pool.migrate()?;

        info!("SQLite connection pool created successfully");
        Ok(pool)
    }

    /// Single-connection in-memory database for tests.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// capped at one connection that is never recycled.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?;

        let pool = DatabasePool::SQLite(Arc::new(pool));
        pool.migrate()?;
        Ok(pool)
    }

    /// Check out a connection
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        match self {
            DatabasePool::SQLite(pool) => pool.get(),
        }
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations");
        let conn = self.get()?;
        run_sqlite_migrations(&conn)?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Round-trip a trivial query to prove the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Describe the current database connection for the health check
    pub fn connection_info(&self) -> Result<String, DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let path: String =
                    conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;

                let location = if path.is_empty() || path == ":memory:" {
                    "SQLite in-memory database".to_string()
                } else {
                    format!("SQLite database at {}", path)
                };

                let state = pool.state();
                Ok(format!(
                    "{} (connections: active={}, idle={})",
                    location, state.connections, state.idle_connections
                ))
            }
        }
    }
}
