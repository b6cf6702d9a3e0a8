use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use glucose_guide_data::database::DatabasePool;
use glucose_guide_domain::health::{self, ComponentStatus as DomainComponentStatus, SystemStatus};

/// Health check response model
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Deployed build identifier
    pub version: String,
    /// Stage the process runs in
    pub environment: String,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What the health check needs to know about the process
#[derive(Debug, Clone)]
pub struct HealthState {
    /// SQLite pool, `None` when running on the in-memory store
    pub pool: Option<DatabasePool>,
    pub environment: String,
    pub version: String,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time; later calls are no-ops
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.set(now_secs());
}

fn map_component_status(status: DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

/// Health check endpoint
#[instrument(skip(state))]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    info!("Health check requested");

    let now = now_secs();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));

    let system_health = health::get_system_health(state.pool.as_ref()).await;

    let database = system_health
        .components
        .get("database")
        .map(|component| ComponentHealthStatus {
            status: map_component_status(component.status),
            message: component.details.clone(),
        })
        .unwrap_or(ComponentHealthStatus {
            status: "ok".to_string(),
            message: None,
        });

    let (code, status) = match system_health.status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::OK, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "error"),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: state.version,
        environment: state.environment,
        timestamp: now,
        uptime,
        components: ComponentStatus { database },
    };

    (code, Json(response))
}
