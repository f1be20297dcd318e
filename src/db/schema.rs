// Database schema: table creation and migrations.
//
// A `schema_version` table tracks which migrations have run. Everything
// else is `IF NOT EXISTS` / `INSERT OR IGNORE`, so calling `create_tables`
// on every startup is safe.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Notification watermark: lowest notification id not yet processed
        CREATE TABLE IF NOT EXISTS watermark (
            id INTEGER PRIMARY KEY CHECK (id = 1),  -- singleton row
            min_id_notification INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO watermark (id, min_id_notification) VALUES (1, 0);

        -- One row per post the bot acted on. Rows are never updated or deleted.
        CREATE TABLE IF NOT EXISTS reshares (
            original_id INTEGER PRIMARY KEY,
            reshare_id TEXT NOT NULL,          -- reblog status id, or '-1' if declined
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_reshares_created
            ON reshares(created_at);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (1)",
        [],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
