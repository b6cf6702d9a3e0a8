use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{CreateMeasurementRequest, DataSet, Measurement, UpdateMeasurementRequest};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStore;
use super::store::{MeasurementStore, ScanFilter};

/// Repository trait for one measurement data set
#[async_trait]
pub trait MeasurementRepositoryTrait<K: DataSet>: Send + Sync {
    /// All records that are not soft-deleted
    async fn find_all(&self) -> Result<Vec<Measurement<K>>, RepositoryError>;

    /// A single live record; `NotFound` when missing or soft-deleted
    async fn find_one(&self, id: &str) -> Result<Measurement<K>, RepositoryError>;

    /// Whether any record, live or soft-deleted, carries `id`
    async fn is_exist(&self, id: &str) -> bool;

    /// Store a new record with a generated id and fresh timestamps
    async fn create_one(&self, request: CreateMeasurementRequest) -> Result<Measurement<K>, RepositoryError>;

    /// Overwrite the mutable fields of a live record
    async fn update_one(
        &self,
        id: &str,
        request: UpdateMeasurementRequest,
    ) -> Result<Measurement<K>, RepositoryError>;

    /// Soft-delete a record. Deleting an already deleted record is a no-op.
    async fn delete_one(&self, id: &str) -> Result<Measurement<K>, RepositoryError>;

    /// Live records of `user_id` from midnight of `from` through the end of the `to` day
    async fn find_many_by_user_id(
        &self,
        user_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Measurement<K>>, RepositoryError>;
}

/// Repository for one measurement data set, backed by any [`MeasurementStore`]
#[derive(Clone)]
pub struct MeasurementRepository<K: DataSet> {
    store: Arc<dyn MeasurementStore<K>>,
}

impl<K: DataSet> MeasurementRepository<K> {
    /// Create a repository over an injected store
    pub fn new(store: Arc<dyn MeasurementStore<K>>) -> Self {
        Self { store }
    }

    /// Repository over a fresh, empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::<K>::new()))
    }

    async fn locate(&self, id: &str) -> Result<Measurement<K>, RepositoryError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn locate_live(&self, id: &str) -> Result<Measurement<K>, RepositoryError> {
        let item = self.locate(id).await?;
        if item.is_deleted {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(item)
    }
}

/// Exclusive upper bound for a range ending on the calendar day of `to`
fn end_of_day(to: NaiveDateTime) -> NaiveDateTime {
    to.date()
        .succ_opt()
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX)
}

#[async_trait]
impl<K: DataSet> MeasurementRepositoryTrait<K> for MeasurementRepository<K> {
    async fn find_all(&self) -> Result<Vec<Measurement<K>>, RepositoryError> {
        debug!("Getting all {} records", K::NAME);
        self.store.scan(ScanFilter::Live).await
    }

    async fn find_one(&self, id: &str) -> Result<Measurement<K>, RepositoryError> {
        debug!("Getting {} record by ID: {}", K::NAME, id);
        self.locate_live(id).await
    }

    async fn is_exist(&self, id: &str) -> bool {
        match self.store.get_by_id(id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!("Failed to look up {} record {}: {}", K::NAME, id, e);
                false
            }
        }
    }

    async fn create_one(&self, request: CreateMeasurementRequest) -> Result<Measurement<K>, RepositoryError> {
        let now = Utc::now();
        let item = Measurement {
            id: Uuid::new_v4().simple().to_string(),
            user_id: request.user_id,
            value: request.value,
            event_timing: request.event_timing,
            record_time: request.record_time,
            sunao_food: request.sunao_food,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            kind: Default::default(),
        };

        self.store.put(item.clone()).await?;
        info!("Created {} record {} for user {}", K::NAME, item.id, item.user_id);
        Ok(item)
    }

    async fn update_one(
        &self,
        id: &str,
        request: UpdateMeasurementRequest,
    ) -> Result<Measurement<K>, RepositoryError> {
        let current = self.locate_live(id).await?;

        let updated = Measurement {
            id: current.id.clone(),
            user_id: current.user_id.clone(),
            value: request.value,
            event_timing: request.event_timing,
            record_time: request.record_time,
            sunao_food: request.sunao_food,
            is_deleted: false,
            created_at: current.created_at,
            updated_at: Utc::now(),
            kind: Default::default(),
        };

        self.store.replace(&current.key(), updated.clone()).await?;
        info!("Updated {} record {}", K::NAME, updated.id);
        Ok(updated)
    }

    async fn delete_one(&self, id: &str) -> Result<Measurement<K>, RepositoryError> {
        let mut item = self.locate(id).await?;
        if item.is_deleted {
            debug!("{} record {} already deleted", K::NAME, id);
            return Ok(item);
        }

        item.is_deleted = true;
        item.updated_at = Utc::now();
        self.store.put(item.clone()).await?;
        info!("Soft-deleted {} record {}", K::NAME, item.id);
        Ok(item)
    }

    async fn find_many_by_user_id(
        &self,
        user_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Measurement<K>>, RepositoryError> {
        let until = end_of_day(to);
        let items = self.store.query(user_id, from, until).await?;
        Ok(items.into_iter().filter(|item| !item.is_deleted).collect())
    }
}
