// Store trait: backend-agnostic async interface for the bot's durable state.
//
// Implementors: SqliteStore (wraps rusqlite), MemoryStore (tests).
// All methods are async so a sync backend behind a Mutex and a future
// native-async backend fit behind the same interface.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ReshareRecord, ReshareResult};
use crate::mastodon::types::StatusId;

#[async_trait]
pub trait Store: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables (or their equivalent).
    async fn table_count(&self) -> Result<i64>;

    // --- Watermark ---

    /// The lowest notification id not yet guaranteed processed.
    async fn watermark(&self) -> Result<StatusId>;

    /// Raise the watermark to `candidate` if higher. Returns the stored value.
    async fn advance_watermark(&self, candidate: StatusId) -> Result<StatusId>;

    /// When the watermark last moved, if known.
    async fn watermark_updated_at(&self) -> Result<Option<String>>;

    // --- Reshare records ---

    /// Look up the record for a post.
    async fn get_reshare(&self, original_id: StatusId) -> Result<Option<ReshareRecord>>;

    /// Insert-only. Returns false if a record already existed.
    async fn insert_reshare(&self, original_id: StatusId, result: ReshareResult) -> Result<bool>;

    /// Total number of records.
    async fn reshare_count(&self) -> Result<i64>;

    /// Most recent records, newest first.
    async fn recent_reshares(&self, limit: u32) -> Result<Vec<ReshareRecord>>;
}
