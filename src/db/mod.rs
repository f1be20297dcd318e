// Database layer: durable reshare records and the notification watermark.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever RETOOTBOT_DB_PATH points
// (defaults to ./retootbot.db).

pub mod memory;
pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;

/// Open (or create) the database and run migrations.
///
/// Called by `retootbot init` and at the start of `run`/`poll`, so a fresh
/// deployment works without a separate init step.
pub fn initialize(db_path: &str, busy_timeout: Duration) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    configure(&conn, busy_timeout)?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str, busy_timeout: Duration) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `retootbot init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    configure(&conn, busy_timeout)?;

    Ok(conn)
}

/// WAL mode plus a bounded wait on a locked database.
fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(busy_timeout)
        .context("Failed to set database busy timeout")?;
    Ok(())
}

/// Initialize the SQLite database and wrap it as a shared Store.
pub fn initialize_sqlite(db_path: &str, busy_timeout: Duration) -> Result<Arc<dyn Store>> {
    let conn = initialize(db_path, busy_timeout)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Open an existing SQLite database as a shared Store.
pub fn open_sqlite(db_path: &str, busy_timeout: Duration) -> Result<Arc<dyn Store>> {
    let conn = open(db_path, busy_timeout)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_database_fails() {
        let path = std::env::temp_dir().join("retootbot-does-not-exist/none.db");
        let err = open(path.to_str().unwrap(), Duration::from_millis(100)).unwrap_err();
        assert!(err.to_string().contains("retootbot init"));
    }

    #[tokio::test]
    async fn test_initialize_then_reopen_keeps_state() {
        let dir = std::env::temp_dir().join(format!("retootbot-test-{}", std::process::id()));
        let path = dir.join("state.db");
        let path = path.to_str().unwrap();

        let store = initialize_sqlite(path, Duration::from_secs(1)).unwrap();
        store
            .insert_reshare(
                crate::mastodon::types::StatusId(7),
                models::ReshareResult::Declined,
            )
            .await
            .unwrap();
        drop(store);

        let reopened = initialize_sqlite(path, Duration::from_secs(1)).unwrap();
        assert_eq!(reopened.reshare_count().await.unwrap(), 1);

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
