use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{DataSet, ItemKey, Measurement, User};
use super::errors::RepositoryError;

/// Which records a full scan returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFilter {
    /// Every stored record, soft-deleted ones included
    All,
    /// Only records that are not soft-deleted
    Live,
}

/// Key-value/range store holding one measurement data set.
///
/// Records are addressed by [`ItemKey`] and can also be looked up by id.
/// Implementations return records in key order.
#[async_trait]
pub trait MeasurementStore<K: DataSet>: Send + Sync {
    /// Look a record up by id, soft-deleted records included
    async fn get_by_id(&self, id: &str) -> Result<Option<Measurement<K>>, RepositoryError>;

    /// Full scan
    async fn scan(&self, filter: ScanFilter) -> Result<Vec<Measurement<K>>, RepositoryError>;

    /// Records of `user_id` with `from <= record_time < until`, ascending
    async fn query(
        &self,
        user_id: &str,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<Measurement<K>>, RepositoryError>;

    /// Insert or overwrite the record at its key
    async fn put(&self, item: Measurement<K>) -> Result<(), RepositoryError>;

    /// Remove the record at `old_key` and store `item`, as one atomic step
    async fn replace(&self, old_key: &ItemKey, item: Measurement<K>) -> Result<(), RepositoryError>;
}

/// Store holding registered users, keyed by id
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by id, soft-deleted users included
    async fn get(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Full scan, ordered by id
    async fn scan(&self, filter: ScanFilter) -> Result<Vec<User>, RepositoryError>;

    /// Store a new user; `AlreadyExists` when the id is taken
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;

    /// Insert or overwrite the user at its id
    async fn put(&self, user: User) -> Result<(), RepositoryError>;
}
