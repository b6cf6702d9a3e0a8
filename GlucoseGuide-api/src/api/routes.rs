use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use glucose_guide_data::database::{DatabaseError, DatabasePool};
use glucose_guide_data::repository::{InMemoryStore, InMemoryUserStore, SqliteStore, SqliteUserStore};
use glucose_guide_domain::entities::{Bgl, DataSet, Hba1c};
use glucose_guide_domain::services::{
    create_measurement_service, create_user_service, CombinedFeedService,
};

use crate::api::handlers::{combined, health, measurement, user};
use crate::api::handlers::health::HealthState;
use crate::api::handlers::measurement::MeasurementService;
use crate::api::handlers::user::UserService;
use crate::config::{AppConfig, StorageBackend};

/// Everything the router hands to its handlers
#[derive(Clone)]
pub struct AppServices {
    pub bgl: MeasurementService<Bgl>,
    pub hba1c: MeasurementService<Hba1c>,
    pub combined: Arc<CombinedFeedService>,
    pub user: UserService,
    pub health: HealthState,
}

impl AppServices {
    fn assemble(
        bgl: MeasurementService<Bgl>,
        hba1c: MeasurementService<Hba1c>,
        user: UserService,
        health: HealthState,
    ) -> Self {
        let combined = Arc::new(CombinedFeedService::new(bgl.clone(), hba1c.clone()));
        Self {
            bgl,
            hba1c,
            combined,
            user,
            health,
        }
    }

    /// Services backed by process memory
    pub fn in_memory() -> Self {
        Self::assemble(
            create_measurement_service(Arc::new(InMemoryStore::<Bgl>::new())),
            create_measurement_service(Arc::new(InMemoryStore::<Hba1c>::new())),
            create_user_service(Arc::new(InMemoryUserStore::new())),
            HealthState {
                pool: None,
                environment: "local".to_string(),
                version: "latest".to_string(),
            },
        )
    }

    /// Services for the configured storage backend
    pub fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        let (bgl, hba1c, user, pool): (
            MeasurementService<Bgl>,
            MeasurementService<Hba1c>,
            UserService,
            _,
        ) = match config.storage {
            StorageBackend::Sqlite => {
                let pool = DatabasePool::connect(&config.database)?;
                info!("Using SQLite database at {}", config.database.sqlite_path);
                (
                    create_measurement_service(Arc::new(SqliteStore::<Bgl>::new(pool.clone()))),
                    create_measurement_service(Arc::new(SqliteStore::<Hba1c>::new(pool.clone()))),
                    create_user_service(Arc::new(SqliteUserStore::new(pool.clone()))),
                    Some(pool),
                )
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; measurements are lost on restart");
                (
                    create_measurement_service(Arc::new(InMemoryStore::<Bgl>::new())),
                    create_measurement_service(Arc::new(InMemoryStore::<Hba1c>::new())),
                    create_user_service(Arc::new(InMemoryUserStore::new())),
                    None,
                )
            }
        };

        Ok(Self::assemble(
            bgl,
            hba1c,
            user,
            HealthState {
                pool,
                environment: config.environment.clone(),
                version: config.version_hash.clone(),
            },
        ))
    }
}

/// CRUD and range routes for one data set
fn measurement_routes<K: DataSet>(service: MeasurementService<K>) -> Router {
    Router::new()
        .route(
            "/",
            get(measurement::list_measurements::<K>).post(measurement::create_measurement::<K>),
        )
        // Before "/:id" so "query" is not taken for an id
        .route("/query", get(measurement::query_measurements::<K>))
        .route(
            "/:id",
            get(measurement::get_measurement::<K>)
                .put(measurement::update_measurement::<K>)
                .patch(measurement::delete_measurement::<K>)
                .delete(measurement::delete_measurement::<K>),
        )
        .with_state(service)
}

fn user_routes(service: UserService) -> Router {
    Router::new()
        .route("/", get(user::list_users).post(user::create_user))
        .route("/:id", get(user::get_user).patch(user::agree_to_terms))
        .with_state(service)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Create the application router
pub fn create_app(services: AppServices, cors_origins: &[String]) -> Router {
    debug!("Creating application router");

    let app = Router::new()
        .nest("/bgl", measurement_routes(services.bgl))
        .nest("/hba1c", measurement_routes(services.hba1c))
        .nest("/user", user_routes(services.user))
        .route(
            "/bgl-and-hba1c/query",
            get(combined::query_combined_feed).with_state(services.combined),
        )
        .route(
            "/healthcheck",
            get(health::health_check).with_state(services.health),
        );

    debug!("Routes configured");

    app.layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_origin_is_accepted() {
        // Building the layer must not panic for either form
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_backend_has_no_pool() {
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let services = AppServices::from_config(&config).unwrap();
        assert!(services.health.pool.is_none());
        assert_eq!(services.health.version, "latest");
    }
}
