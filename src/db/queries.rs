// Database queries: every SQL statement the bot runs.
//
// Status ids are u64 in Rust and INTEGER (i64) in SQLite. Mastodon ids fit
// comfortably in i64, but the conversion is checked rather than cast.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{ReshareRecord, ReshareResult};
use crate::mastodon::types::StatusId;

fn to_sql_id(id: StatusId) -> Result<i64> {
    i64::try_from(id.0).with_context(|| format!("Status id {id} does not fit in SQLite INTEGER"))
}

fn from_sql_id(value: i64) -> Result<StatusId> {
    u64::try_from(value)
        .map(StatusId)
        .with_context(|| format!("Negative status id {value} in database"))
}

// --- Watermark ---

/// Read the notification watermark.
pub fn get_watermark(conn: &Connection) -> Result<StatusId> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT min_id_notification FROM watermark WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match value {
        Some(v) => from_sql_id(v),
        // create_tables seeds the row; a missing row means it never ran
        None => anyhow::bail!("Watermark row missing. Run `retootbot init` first."),
    }
}

/// Raise the watermark to `candidate` if it is higher. Returns the stored value.
pub fn advance_watermark(conn: &Connection, candidate: StatusId) -> Result<StatusId> {
    conn.execute(
        "UPDATE watermark
         SET min_id_notification = ?1, updated_at = datetime('now')
         WHERE id = 1 AND min_id_notification < ?1",
        params![to_sql_id(candidate)?],
    )?;
    get_watermark(conn)
}

/// When the watermark last moved.
pub fn watermark_updated_at(conn: &Connection) -> Result<Option<String>> {
    let result = conn
        .query_row("SELECT updated_at FROM watermark WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(result)
}

// --- Reshares ---

fn row_to_record(original_id: i64, reshare_id: String, created_at: String) -> Result<ReshareRecord> {
    Ok(ReshareRecord {
        original_id: from_sql_id(original_id)?,
        result: ReshareResult::from_db(&reshare_id)?,
        created_at,
    })
}

/// Look up the record for a post, if the bot has already acted on it.
pub fn get_reshare(conn: &Connection, original_id: StatusId) -> Result<Option<ReshareRecord>> {
    let mut stmt = conn.prepare(
        "SELECT original_id, reshare_id, created_at FROM reshares WHERE original_id = ?1",
    )?;
    let row: Option<(i64, String, String)> = stmt
        .query_row(params![to_sql_id(original_id)?], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()?;

    row.map(|(id, reshare, at)| row_to_record(id, reshare, at))
        .transpose()
}

/// Insert a record. Returns false (and writes nothing) if one already exists.
pub fn insert_reshare(
    conn: &Connection,
    original_id: StatusId,
    result: ReshareResult,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO reshares (original_id, reshare_id, created_at)
         VALUES (?1, ?2, datetime('now'))",
        params![to_sql_id(original_id)?, result.to_db()],
    )?;
    Ok(inserted == 1)
}

/// Total number of records.
pub fn reshare_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM reshares", [], |row| row.get(0))?;
    Ok(count)
}

/// Most recent records, newest first.
pub fn recent_reshares(conn: &Connection, limit: u32) -> Result<Vec<ReshareRecord>> {
    let mut stmt = conn.prepare(
        "SELECT original_id, reshare_id, created_at FROM reshares
         ORDER BY created_at DESC, original_id DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, reshare, at) = row?;
        records.push(row_to_record(id, reshare, at)?);
    }
    Ok(records)
}
