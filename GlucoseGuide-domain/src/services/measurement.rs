use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, instrument, warn};
use validator::{Validate, ValidationErrors};

use glucose_guide_data::repository::{
    MeasurementRepository, MeasurementRepositoryTrait, MeasurementStore, RepositoryError,
};

use crate::entities::conversions;
use crate::entities::{CreateMeasurement, DataSet, Measurement, UpdateMeasurement};
use crate::services::date_range::{DateRange, DateRangeError};

/// Measurement service errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeasurementServiceError {
    /// No live record with the requested id
    #[error("Measurement not found: {0}")]
    NotFound(String),

    /// Input that cannot be parsed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Date range whose start lies after its end
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Input that parses but breaks a field rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DateRangeError> for MeasurementServiceError {
    fn from(err: DateRangeError) -> Self {
        match err {
            DateRangeError::InvalidFormat(_) => MeasurementServiceError::InvalidFormat(err.to_string()),
            DateRangeError::InvalidRange { .. } => MeasurementServiceError::InvalidRange(err.to_string()),
        }
    }
}

/// Trait for measurement service operations on one data set
#[async_trait]
pub trait MeasurementServiceTrait<K: DataSet>: Send + Sync {
    /// All live measurements
    async fn find_all(&self) -> Result<Vec<Measurement<K>>, MeasurementServiceError>;

    /// A single live measurement
    async fn find_one(&self, id: &str) -> Result<Measurement<K>, MeasurementServiceError>;

    /// Validate and store a new measurement
    async fn create_one(&self, request: CreateMeasurement) -> Result<Measurement<K>, MeasurementServiceError>;

    /// Validate and apply an update
    async fn update_one(
        &self,
        id: &str,
        request: UpdateMeasurement,
    ) -> Result<Measurement<K>, MeasurementServiceError>;

    /// Soft-delete a measurement
    async fn delete_one(&self, id: &str) -> Result<Measurement<K>, MeasurementServiceError>;

    /// Live measurements of a user between two `YYYYMMDD` days, inclusive
    async fn find_many_by_user_id(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<Measurement<K>>, MeasurementServiceError>;

    /// Live measurements of a user within an already validated range
    async fn find_in_range(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<Measurement<K>>, MeasurementServiceError>;
}

/// Measurement service for domain logic
pub struct MeasurementService<K: DataSet, R: MeasurementRepositoryTrait<K>> {
    repository: R,
    kind: PhantomData<K>,
}

impl<K: DataSet, R: MeasurementRepositoryTrait<K>> MeasurementService<K, R> {
    /// Create a new measurement service
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            kind: PhantomData,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MeasurementServiceError {
        match err {
            RepositoryError::NotFound(id) => {
                MeasurementServiceError::NotFound(format!("{} measurement {}", K::NAME, id))
            }
            _ => {
                error!("{} repository failure: {}", K::NAME, err);
                MeasurementServiceError::Storage(err.to_string())
            }
        }
    }
}

/// Flatten validator output into a single message
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

fn validate<T: Validate>(request: &T) -> Result<(), MeasurementServiceError> {
    request.validate().map_err(|errors| {
        let message = validation_message(&errors);
        warn!("Rejected measurement input: {}", message);
        MeasurementServiceError::Validation(message)
    })
}

#[async_trait]
impl<K, R> MeasurementServiceTrait<K> for MeasurementService<K, R>
where
    K: DataSet,
    R: MeasurementRepositoryTrait<K>,
{
    async fn find_all(&self) -> Result<Vec<Measurement<K>>, MeasurementServiceError> {
        self.repository.find_all().await.map_err(|e| self.map_repo_error(e))
    }

    async fn find_one(&self, id: &str) -> Result<Measurement<K>, MeasurementServiceError> {
        self.repository.find_one(id).await.map_err(|e| self.map_repo_error(e))
    }

    #[instrument(skip(self, request), fields(data_set = K::NAME))]
    async fn create_one(&self, request: CreateMeasurement) -> Result<Measurement<K>, MeasurementServiceError> {
        validate(&request)?;
        self.repository
            .create_one(conversions::convert_to_data_create_request(request))
            .await
            .map_err(|e| self.map_repo_error(e))
    }

    #[instrument(skip(self, request), fields(data_set = K::NAME))]
    async fn update_one(
        &self,
        id: &str,
        request: UpdateMeasurement,
    ) -> Result<Measurement<K>, MeasurementServiceError> {
        validate(&request)?;
        self.repository
            .update_one(id, conversions::convert_to_data_update_request(request))
            .await
            .map_err(|e| self.map_repo_error(e))
    }

    #[instrument(skip(self), fields(data_set = K::NAME))]
    async fn delete_one(&self, id: &str) -> Result<Measurement<K>, MeasurementServiceError> {
        self.repository.delete_one(id).await.map_err(|e| self.map_repo_error(e))
    }

    async fn find_many_by_user_id(
        &self,
        user_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<Measurement<K>>, MeasurementServiceError> {
        let range = DateRange::parse(from, to)?;
        self.find_in_range(user_id, &range).await
    }

    async fn find_in_range(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<Measurement<K>>, MeasurementServiceError> {
        self.repository
            .find_many_by_user_id(user_id, range.from, range.to)
            .await
            .map_err(|e| self.map_repo_error(e))
    }
}

/// Create a measurement service over the given store
pub fn create_measurement_service<K: DataSet>(
    store: Arc<dyn MeasurementStore<K>>,
) -> Arc<dyn MeasurementServiceTrait<K>> {
    Arc::new(MeasurementService::new(MeasurementRepository::new(store)))
}

/// Create a measurement service over a fresh in-memory store
pub fn create_in_memory_measurement_service<K: DataSet>() -> Arc<dyn MeasurementServiceTrait<K>> {
    Arc::new(MeasurementService::new(MeasurementRepository::<K>::in_memory()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, Utc};
    use glucose_guide_data::models::{
        Bgl, CreateMeasurementRequest, EventTiming, UpdateMeasurementRequest,
    };
    use mockall::mock;

    mock! {
        pub BglRepository {}

        #[async_trait]
        impl MeasurementRepositoryTrait<Bgl> for BglRepository {
            async fn find_all(&self) -> Result<Vec<Measurement<Bgl>>, RepositoryError>;
            async fn find_one(&self, id: &str) -> Result<Measurement<Bgl>, RepositoryError>;
            async fn is_exist(&self, id: &str) -> bool;
            async fn create_one(&self, request: CreateMeasurementRequest) -> Result<Measurement<Bgl>, RepositoryError>;
            async fn update_one(
                &self,
                id: &str,
                request: UpdateMeasurementRequest,
            ) -> Result<Measurement<Bgl>, RepositoryError>;
            async fn delete_one(&self, id: &str) -> Result<Measurement<Bgl>, RepositoryError>;
            async fn find_many_by_user_id(
                &self,
                user_id: &str,
                from: NaiveDateTime,
                to: NaiveDateTime,
            ) -> Result<Vec<Measurement<Bgl>>, RepositoryError>;
        }
    }

    fn midnight(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn stored(id: &str) -> Measurement<Bgl> {
        Measurement {
            id: id.to_string(),
            user_id: "u1".to_string(),
            value: 101.0,
            event_timing: EventTiming::BeforeMeal,
            record_time: midnight(18),
            sunao_food: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            kind: PhantomData,
        }
    }

    fn create_request(value: f64) -> CreateMeasurement {
        CreateMeasurement {
            user_id: "u1".to_string(),
            value,
            event_timing: EventTiming::BeforeMeal,
            record_time: midnight(18),
            sunao_food: None,
        }
    }

    #[tokio::test]
    async fn test_not_found_maps_to_not_found() {
        let mut repo = MockBglRepository::new();
        repo.expect_find_one()
            .times(1)
            .returning(|id| Err(RepositoryError::NotFound(id.to_string())));

        let service = MeasurementService::new(repo);
        let err = service.find_one("abc").await.unwrap_err();
        assert!(matches!(err, MeasurementServiceError::NotFound(ref msg) if msg.contains("abc")));
    }

    #[tokio::test]
    async fn test_storage_failure_maps_to_storage() {
        let mut repo = MockBglRepository::new();
        repo.expect_find_all()
            .times(1)
            .returning(|| Err(RepositoryError::Lock("store mutex poisoned".to_string())));

        let service = MeasurementService::new(repo);
        assert!(matches!(
            service.find_all().await,
            Err(MeasurementServiceError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_repository() {
        let mut repo = MockBglRepository::new();
        repo.expect_create_one().times(0);

        let service = MeasurementService::new(repo);
        let err = service.create_one(create_request(-1.0)).await.unwrap_err();
        assert!(matches!(err, MeasurementServiceError::Validation(ref msg) if msg.contains("value")));
    }

    #[tokio::test]
    async fn test_valid_create_is_forwarded() {
        let mut repo = MockBglRepository::new();
        repo.expect_create_one()
            .withf(|request| request.user_id == "u1" && request.value == 101.0)
            .times(1)
            .returning(|_| Ok(stored("new")));

        let service = MeasurementService::new(repo);
        let created = service.create_one(create_request(101.0)).await.unwrap();
        assert_eq!(created.id, "new");
    }

    #[tokio::test]
    async fn test_range_query_validates_before_repository() {
        let mut repo = MockBglRepository::new();
        repo.expect_find_many_by_user_id().times(0);

        let service = MeasurementService::new(repo);
        assert!(matches!(
            service.find_many_by_user_id("u1", "20240719", "20240718").await,
            Err(MeasurementServiceError::InvalidRange(_))
        ));
        assert!(matches!(
            service.find_many_by_user_id("u1", "2024-07-18", "20240718").await,
            Err(MeasurementServiceError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_range_query_passes_midnight_bounds() {
        let mut repo = MockBglRepository::new();
        repo.expect_find_many_by_user_id()
            .withf(|user_id, from, to| {
                user_id == "u1" && *from == midnight(17) && *to == midnight(18)
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![stored("a")]));

        let service = MeasurementService::new(repo);
        let found = service.find_many_by_user_id("u1", "20240717", "20240718").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_service_round_trip() {
        let service = create_in_memory_measurement_service::<Bgl>();
        let created = service.create_one(create_request(88.0)).await.unwrap();

        let update = UpdateMeasurement {
            value: 92.0,
            event_timing: EventTiming::Bedtime,
            record_time: midnight(19),
            sunao_food: None,
        };
        let updated = service.update_one(&created.id, update).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.value, 92.0);

        service.delete_one(&created.id).await.unwrap();
        assert!(matches!(
            service.find_one(&created.id).await,
            Err(MeasurementServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_update_reports_storage_and_keeps_record() {
        use glucose_guide_data::database::DatabasePool;
        use glucose_guide_data::repository::SqliteStore;

        let pool = DatabasePool::in_memory().unwrap();
        let service = create_measurement_service::<Bgl>(Arc::new(SqliteStore::new(pool.clone())));
        let created = service.create_one(create_request(101.0)).await.unwrap();

        {
            let conn = pool.get().unwrap();
            conn.execute_batch(
                "CREATE TRIGGER block_insert BEFORE INSERT ON bgl_readings
                 BEGIN SELECT RAISE(ABORT, 'insert blocked'); END;",
            )
            .unwrap();
        }

        let update = UpdateMeasurement {
            value: 140.0,
            event_timing: EventTiming::Other,
            record_time: midnight(20),
            sunao_food: None,
        };
        assert!(matches!(
            service.update_one(&created.id, update).await,
            Err(MeasurementServiceError::Storage(_))
        ));
        assert_eq!(service.find_one(&created.id).await.unwrap(), created);
    }
}
