use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::record_time::STORAGE_FORMAT;
use crate::models::{DataSet, ItemKey, Measurement, User};
use super::errors::RepositoryError;
use super::store::{MeasurementStore, ScanFilter, UserStore};

const COLUMNS: &str =
    "id, user_id, value, event_timing, record_time, sunao_food, is_deleted, created_at, updated_at";

/// SQLite backed storage for one measurement data set
#[derive(Debug, Clone)]
pub struct SqliteStore<K: DataSet> {
    pool: DatabasePool,
    kind: PhantomData<K>,
}

impl<K: DataSet> SqliteStore<K> {
    /// Create a store on top of an already migrated pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    fn select(&self, clause: &str) -> String {
        format!("SELECT {} FROM {} {}", COLUMNS, K::TABLE, clause)
    }
}

fn record_time_text(value: &NaiveDateTime) -> String {
    value.format(STORAGE_FORMAT).to_string()
}

fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn row_to_measurement<K: DataSet>(row: &Row<'_>) -> rusqlite::Result<Measurement<K>> {
    let event_timing: String = row.get(3)?;
    let record_time: String = row.get(4)?;
    let sunao_food: Option<String> = row.get(5)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Measurement {
        id: row.get(0)?,
        user_id: row.get(1)?,
        value: row.get(2)?,
        event_timing: event_timing.parse().map_err(|e| conversion_error(3, e))?,
        record_time: NaiveDateTime::parse_from_str(&record_time, STORAGE_FORMAT)
            .map_err(|e| conversion_error(4, e))?,
        sunao_food: sunao_food
            .map(|food| food.parse())
            .transpose()
            .map_err(|e| conversion_error(5, e))?,
        is_deleted: row.get(6)?,
        created_at: parse_timestamp(7, &created_at)?,
        updated_at: parse_timestamp(8, &updated_at)?,
        kind: PhantomData,
    })
}

fn write_item<K: DataSet>(conn: &Connection, item: &Measurement<K>) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            K::TABLE,
            COLUMNS
        ),
        params![
            item.id,
            item.user_id,
            item.value,
            item.event_timing.as_str(),
            record_time_text(&item.record_time),
            item.sunao_food.map(|food| food.as_str()),
            item.is_deleted,
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ],
    )
}

#[async_trait]
impl<K: DataSet> MeasurementStore<K> for SqliteStore<K> {
    async fn get_by_id(&self, id: &str) -> Result<Option<Measurement<K>>, RepositoryError> {
        debug!("Getting {} record by ID from database: id={}", K::NAME, id);

        let conn = self.pool.get()?;
        let item = conn
            .query_row(&self.select("WHERE id = ?1"), params![id], row_to_measurement::<K>)
            .optional()?;
        Ok(item)
    }

    async fn scan(&self, filter: ScanFilter) -> Result<Vec<Measurement<K>>, RepositoryError> {
        debug!("Scanning {} records ({:?})", K::NAME, filter);

        let clause = match filter {
            ScanFilter::All => "ORDER BY user_id, record_time, id",
            ScanFilter::Live => "WHERE is_deleted = 0 ORDER BY user_id, record_time, id",
        };

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&self.select(clause))?;
        let rows = stmt.query_map([], row_to_measurement::<K>)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn query(
        &self,
        user_id: &str,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<Measurement<K>>, RepositoryError> {
        debug!("Querying {} for user {} in [{}, {})", K::NAME, user_id, from, until);

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&self.select(
            "WHERE user_id = ?1 AND record_time >= ?2 AND record_time < ?3 \
             ORDER BY record_time, id",
        ))?;
        let rows = stmt.query_map(
            params![user_id, record_time_text(&from), record_time_text(&until)],
            row_to_measurement::<K>,
        )?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn put(&self, item: Measurement<K>) -> Result<(), RepositoryError> {
        debug!("Storing {} record in database: id={}", K::NAME, item.id);

        let conn = self.pool.get()?;
        write_item(&conn, &item)?;
        Ok(())
    }

    async fn replace(&self, old_key: &ItemKey, item: Measurement<K>) -> Result<(), RepositoryError> {
        debug!("Replacing {} record in database: id={}", K::NAME, item.id);

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND record_time = ?2 AND id = ?3",
                K::TABLE
            ),
            params![
                old_key.user_id,
                record_time_text(&old_key.record_time),
                old_key.id
            ],
        )?;
        write_item(&tx, &item)?;
        tx.commit()?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, term_agreed_at, is_deleted, created_at, updated_at";

/// SQLite backed storage for users
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: DatabasePool,
}

impl SqliteUserStore {
    /// Create a store on top of an already migrated pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let term_agreed_at: Option<String> = row.get(1)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(User {
        id: row.get(0)?,
        term_agreed_at: term_agreed_at
            .map(|raw| parse_timestamp(1, &raw))
            .transpose()?,
        is_deleted: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
        updated_at: parse_timestamp(4, &updated_at)?,
    })
}

fn write_user(conn: &Connection, verb: &str, user: &User) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("{} INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5)", verb, USER_COLUMNS),
        params![
            user.id,
            user.term_agreed_at.map(|t| t.to_rfc3339()),
            user.is_deleted,
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339(),
        ],
    )
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        debug!("Getting user from database: id={}", id);

        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn scan(&self, filter: ScanFilter) -> Result<Vec<User>, RepositoryError> {
        let clause = match filter {
            ScanFilter::All => "ORDER BY id",
            ScanFilter::Live => "WHERE is_deleted = 0 ORDER BY id",
        };

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users {}", USER_COLUMNS, clause))?;
        let rows = stmt.query_map([], row_to_user)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        debug!("Inserting user into database: id={}", user.id);

        let conn = self.pool.get()?;
        match write_user(&conn, "INSERT", &user) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepositoryError::AlreadyExists(user.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, user: User) -> Result<(), RepositoryError> {
        debug!("Storing user in database: id={}", user.id);

        let conn = self.pool.get()?;
        write_user(&conn, "INSERT OR REPLACE", &user)?;
        Ok(())
    }
}
