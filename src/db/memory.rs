// MemoryStore: in-process Store implementation for tests.
//
// Same semantics as SqliteStore (insert-only records, monotonic watermark)
// without touching the filesystem. Nothing survives a restart, so it must
// never back a real bot.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ReshareRecord, ReshareResult};
use super::traits::Store;
use crate::mastodon::types::StatusId;

#[derive(Default)]
struct Inner {
    watermark: StatusId,
    watermark_updated_at: Option<String>,
    reshares: HashMap<StatusId, ReshareRecord>,
    /// Insertion order, for `recent_reshares`.
    order: Vec<StatusId>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Starts like a freshly created database: watermark 0, stamped now.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                watermark_updated_at: Some(now()),
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[async_trait]
impl Store for MemoryStore {
    async fn table_count(&self) -> Result<i64> {
        // watermark slot + reshare table
        Ok(2)
    }

    async fn watermark(&self) -> Result<StatusId> {
        Ok(self.lock().watermark)
    }

    async fn advance_watermark(&self, candidate: StatusId) -> Result<StatusId> {
        let mut inner = self.lock();
        if candidate > inner.watermark {
            inner.watermark = candidate;
            inner.watermark_updated_at = Some(now());
        }
        Ok(inner.watermark)
    }

    async fn watermark_updated_at(&self) -> Result<Option<String>> {
        Ok(self.lock().watermark_updated_at.clone())
    }

    async fn get_reshare(&self, original_id: StatusId) -> Result<Option<ReshareRecord>> {
        Ok(self.lock().reshares.get(&original_id).cloned())
    }

    async fn insert_reshare(&self, original_id: StatusId, result: ReshareResult) -> Result<bool> {
        let mut inner = self.lock();
        if inner.reshares.contains_key(&original_id) {
            return Ok(false);
        }
        inner.reshares.insert(
            original_id,
            ReshareRecord {
                original_id,
                result,
                created_at: now(),
            },
        );
        inner.order.push(original_id);
        Ok(true)
    }

    async fn reshare_count(&self) -> Result<i64> {
        Ok(self.lock().reshares.len() as i64)
    }

    async fn recent_reshares(&self, limit: u32) -> Result<Vec<ReshareRecord>> {
        let inner = self.lock();
        Ok(inner
            .order
            .iter()
            .rev()
            .take(limit as usize)
            .filter_map(|id| inner.reshares.get(id).cloned())
            .collect())
    }
}
