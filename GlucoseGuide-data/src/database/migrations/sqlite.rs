use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;
use crate::models::{Bgl, DataSet, Hba1c};

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_measurement_table::<Bgl>(conn)?;
    create_measurement_table::<Hba1c>(conn)?;
    create_users_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the table for one measurement data set.
///
/// The primary key mirrors the in-memory ordering: partition by user, sort by
/// record time, id as tiebreaker. `record_time` is stored as fixed width text
/// so that lexical order is chronological.
fn create_measurement_table<K: DataSet>(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating {} table if not exists", K::TABLE);

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            value REAL NOT NULL,
            event_timing TEXT NOT NULL,
            record_time TEXT NOT NULL,
            sunao_food TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, record_time, id)
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_id ON {table} (id);",
        table = K::TABLE
    ))
    .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", K::TABLE, e)))?;

    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            term_agreed_at TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
    .map_err(|e| DatabaseError::MigrationError(format!("users: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%_id'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 2);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO bgl_readings
            (id, user_id, value, event_timing, record_time, created_at, updated_at)
            VALUES (?1, ?2, 100.0, 'other', ?3, 'x', 'x')";
        conn.execute(insert, ["same", "u1", "2024-07-18T08:00:00.000000000"]).unwrap();
        assert!(conn
            .execute(insert, ["same", "u2", "2024-07-18T09:00:00.000000000"])
            .is_err());
    }

    #[test]
    fn test_users_table_is_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (id, created_at, updated_at) VALUES ('000001', 'x', 'x')",
            [],
        )
        .unwrap();
        let agreed: Option<String> = conn
            .query_row("SELECT term_agreed_at FROM users WHERE id = '000001'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(agreed, None);
    }
}
