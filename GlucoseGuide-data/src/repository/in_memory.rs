use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::models::{DataSet, ItemKey, Measurement, User};
use super::errors::RepositoryError;
use super::store::{MeasurementStore, ScanFilter, UserStore};

#[derive(Debug)]
struct Tables<K: DataSet> {
    /// Records ordered by (user_id, record_time, id)
    items: BTreeMap<ItemKey, Measurement<K>>,
    /// Secondary index from id to primary key
    ids: HashMap<String, ItemKey>,
}

impl<K: DataSet> Tables<K> {
    fn remove(&mut self, key: &ItemKey) {
        if let Some(old) = self.items.remove(key) {
            self.ids.remove(&old.id);
        }
    }

    fn insert(&mut self, item: Measurement<K>) {
        let key = item.key();
        // An id lives at exactly one key
        if let Some(previous) = self.ids.get(&item.id).cloned() {
            if previous != key {
                self.items.remove(&previous);
            }
        }
        self.ids.insert(item.id.clone(), key.clone());
        self.items.insert(key, item);
    }
}

/// In-memory storage for one measurement data set
#[derive(Debug, Clone)]
pub struct InMemoryStore<K: DataSet> {
    tables: Arc<Mutex<Tables<K>>>,
}

impl<K: DataSet> Default for InMemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: DataSet> InMemoryStore<K> {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables {
                items: BTreeMap::new(),
                ids: HashMap::new(),
            })),
        }
    }
}

#[async_trait]
impl<K: DataSet> MeasurementStore<K> for InMemoryStore<K> {
    async fn get_by_id(&self, id: &str) -> Result<Option<Measurement<K>>, RepositoryError> {
        let tables = self.tables.lock()?;
        match tables.ids.get(id) {
            Some(key) => match tables.items.get(key) {
                Some(item) => Ok(Some(item.clone())),
                None => Err(RepositoryError::Corrupt(format!(
                    "{} id {} indexed without a record",
                    K::NAME,
                    id
                ))),
            },
            None => Ok(None),
        }
    }

    async fn scan(&self, filter: ScanFilter) -> Result<Vec<Measurement<K>>, RepositoryError> {
        let tables = self.tables.lock()?;
        let items = tables
            .items
            .values()
            .filter(|item| filter == ScanFilter::All || !item.is_deleted)
            .cloned()
            .collect();
        Ok(items)
    }

    async fn query(
        &self,
        user_id: &str,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<Measurement<K>>, RepositoryError> {
        debug!("Querying {} for user {} in [{}, {})", K::NAME, user_id, from, until);

        if from >= until {
            return Ok(Vec::new());
        }

        // The empty id sorts before every real id
        let lower = ItemKey {
            user_id: user_id.to_string(),
            record_time: from,
            id: String::new(),
        };
        let upper = ItemKey {
            user_id: user_id.to_string(),
            record_time: until,
            id: String::new(),
        };

        let tables = self.tables.lock()?;
        let items = tables
            .items
            .range((Bound::Included(lower), Bound::Excluded(upper)))
            .map(|(_, item)| item.clone())
            .collect();
        Ok(items)
    }

    async fn put(&self, item: Measurement<K>) -> Result<(), RepositoryError> {
        debug!("Storing {} record in memory: id={}", K::NAME, item.id);
        let mut tables = self.tables.lock()?;
        tables.insert(item);
        Ok(())
    }

    async fn replace(&self, old_key: &ItemKey, item: Measurement<K>) -> Result<(), RepositoryError> {
        debug!("Replacing {} record in memory: id={}", K::NAME, item.id);
        let mut tables = self.tables.lock()?;
        tables.remove(old_key);
        tables.insert(item);
        Ok(())
    }
}

/// In-memory storage for users
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<BTreeMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock()?;
        Ok(users.get(id).cloned())
    }

    async fn scan(&self, filter: ScanFilter) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.lock()?;
        Ok(users
            .values()
            .filter(|user| filter == ScanFilter::All || !user.is_deleted)
            .cloned()
            .collect())
    }

    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        debug!("Inserting user in memory: id={}", user.id);
        let mut users = self.users.lock()?;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists(user.id));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn put(&self, user: User) -> Result<(), RepositoryError> {
        debug!("Storing user in memory: id={}", user.id);
        let mut users = self.users.lock()?;
        users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bgl;
    use crate::repository::test_support::{at, sample, sample_user};

    #[tokio::test]
    async fn test_query_is_half_open() {
        let store = InMemoryStore::<Bgl>::new();
        store.put(sample("u1", at(18, 0, 0))).await.unwrap();
        store.put(sample("u1", at(18, 23, 59))).await.unwrap();
        store.put(sample("u1", at(19, 0, 0))).await.unwrap();
        store.put(sample("u2", at(18, 12, 0))).await.unwrap();

        let found = store.query("u1", at(18, 0, 0), at(19, 0, 0)).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|m| m.user_id == "u1"));
        assert!(found[0].record_time < found[1].record_time);
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let store = InMemoryStore::<Bgl>::new();
        store.put(sample("u1", at(18, 8, 0))).await.unwrap();

        let found = store.query("u1", at(19, 0, 0), at(18, 0, 0)).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_replace_moves_record_to_new_key() {
        let store = InMemoryStore::<Bgl>::new();
        let original = sample("u1", at(18, 8, 0));
        store.put(original.clone()).await.unwrap();

        let mut moved = original.clone();
        moved.record_time = at(20, 8, 0);
        store.replace(&original.key(), moved.clone()).await.unwrap();

        let all = store.scan(ScanFilter::All).await.unwrap();
        assert_eq!(all, vec![moved.clone()]);
        assert_eq!(store.get_by_id(&original.id).await.unwrap(), Some(moved));
    }

    #[tokio::test]
    async fn test_put_with_known_id_drops_stale_key() {
        let store = InMemoryStore::<Bgl>::new();
        let original = sample("u1", at(18, 8, 0));
        store.put(original.clone()).await.unwrap();

        let mut moved = original.clone();
        moved.record_time = at(18, 9, 0);
        store.put(moved).await.unwrap();

        assert_eq!(store.scan(ScanFilter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_insert_rejects_taken_id() {
        let store = InMemoryUserStore::new();
        store.insert(sample_user("000001")).await.unwrap();

        assert!(matches!(
            store.insert(sample_user("000001")).await,
            Err(RepositoryError::AlreadyExists(ref id)) if id == "000001"
        ));
        assert_eq!(store.scan(ScanFilter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_scan_is_ordered_and_filtered() {
        let store = InMemoryUserStore::new();
        store.insert(sample_user("b")).await.unwrap();
        store.insert(sample_user("a")).await.unwrap();
        let mut gone = sample_user("c");
        gone.is_deleted = true;
        store.put(gone).await.unwrap();

        let live: Vec<_> = store
            .scan(ScanFilter::Live)
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(live, vec!["a".to_string(), "b".to_string()]);
        assert!(store.get("c").await.unwrap().is_some());
    }
}
