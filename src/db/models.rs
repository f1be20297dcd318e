// Data models: the two durable structures the bot keeps.
//
// Kept separate from the queries so the pipeline can use them without
// depending on rusqlite directly.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::mastodon::types::StatusId;

/// Stored in place of a reshare id when a post was declined.
pub const DECLINED_SENTINEL: &str = "-1";

/// What happened to a post the bot was asked to reshare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReshareResult {
    /// Reshared; carries the id of the reblog status.
    Reshared(StatusId),
    /// Not eligible (private or direct visibility). Never retried.
    Declined,
}

impl ReshareResult {
    /// The text form stored in the `reshare_id` column.
    pub fn to_db(&self) -> String {
        match self {
            ReshareResult::Reshared(id) => id.to_string(),
            ReshareResult::Declined => DECLINED_SENTINEL.to_string(),
        }
    }

    pub fn from_db(value: &str) -> Result<Self> {
        if value == DECLINED_SENTINEL {
            return Ok(ReshareResult::Declined);
        }
        let id = value
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid reshare id {value:?} in database: {e}"))?;
        Ok(ReshareResult::Reshared(id))
    }
}

impl fmt::Display for ReshareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshareResult::Reshared(id) => write!(f, "reshared as {id}"),
            ReshareResult::Declined => f.write_str("declined"),
        }
    }
}

/// One row of the `reshares` table, a permanent idempotency fence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshareRecord {
    pub original_id: StatusId,
    pub result: ReshareResult,
    pub created_at: String,
}
