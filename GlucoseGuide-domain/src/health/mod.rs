//! Domain layer health check functionality

use std::collections::HashMap;

use glucose_guide_data::database::DatabasePool;
use tracing::warn;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Check that the measurement store answers.
///
/// `None` means the process runs on the in-memory store, which is always
/// available. A SQLite pool must answer a query; failing to describe the
/// connection afterwards only degrades the component.
pub fn check_database(pool: Option<&DatabasePool>) -> HealthComponent {
    let Some(pool) = pool else {
        return HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some("In-memory store".to_string()),
        };
    };

    if let Err(e) = pool.ping() {
        warn!("Database health check failed: {}", e);
        return HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(format!("Database connection error: {}", e)),
        };
    }

    match pool.connection_info() {
        Ok(info) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(info),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!("Database answers but cannot be described: {}", e)),
        },
    }
}

/// Get overall system health
pub async fn get_system_health(pool: Option<&DatabasePool>) -> SystemHealth {
    let db_component = check_database(pool);

    let overall_status = match db_component.status {
        ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        ComponentStatus::Degraded => SystemStatus::Degraded,
        ComponentStatus::Healthy => SystemStatus::Healthy,
    };

    SystemHealth {
        status: overall_status,
        components: vec![("database".to_string(), db_component)].into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_is_healthy() {
        let health = get_system_health(None).await;
        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("database"));
    }

    #[tokio::test]
    async fn test_sqlite_pool_is_healthy() {
        let pool = DatabasePool::in_memory().unwrap();
        let health = get_system_health(Some(&pool)).await;

        assert_eq!(health.status, SystemStatus::Healthy);
        let database = &health.components["database"];
        assert!(database.details.as_deref().unwrap_or_default().contains("SQLite"));
    }
}
