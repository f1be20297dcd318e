// SqliteStore: rusqlite backend implementing the Store trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{ReshareRecord, ReshareResult};
use super::traits::Store;
use crate::mastodon::types::StatusId;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn watermark(&self) -> Result<StatusId> {
        let conn = self.conn.lock().await;
        super::queries::get_watermark(&conn)
    }

    async fn advance_watermark(&self, candidate: StatusId) -> Result<StatusId> {
        let conn = self.conn.lock().await;
        super::queries::advance_watermark(&conn, candidate)
    }

    async fn watermark_updated_at(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::watermark_updated_at(&conn)
    }

    async fn get_reshare(&self, original_id: StatusId) -> Result<Option<ReshareRecord>> {
        let conn = self.conn.lock().await;
        super::queries::get_reshare(&conn, original_id)
    }

    async fn insert_reshare(&self, original_id: StatusId, result: ReshareResult) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::insert_reshare(&conn, original_id, result)
    }

    async fn reshare_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::reshare_count(&conn)
    }

    async fn recent_reshares(&self, limit: u32) -> Result<Vec<ReshareRecord>> {
        let conn = self.conn.lock().await;
        super::queries::recent_reshares(&conn, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    async fn test_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteStore::new(conn)
    }

    #[tokio::test]
    async fn test_trait_watermark_roundtrip() {
        let store = test_store().await;
        assert_eq!(store.watermark().await.unwrap(), StatusId::MIN);
        store.advance_watermark(StatusId(12)).await.unwrap();
        assert_eq!(store.watermark().await.unwrap(), StatusId(12));
        assert!(store.watermark_updated_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_trait_reshare_fence() {
        let store = test_store().await;
        assert!(store
            .insert_reshare(StatusId(5), ReshareResult::Declined)
            .await
            .unwrap());
        assert!(!store
            .insert_reshare(StatusId(5), ReshareResult::Reshared(StatusId(6)))
            .await
            .unwrap());
        let record = store.get_reshare(StatusId(5)).await.unwrap().unwrap();
        assert_eq!(record.result, ReshareResult::Declined);
        assert_eq!(store.reshare_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let store = test_store().await;
        assert_eq!(store.table_count().await.unwrap(), 3);
    }
}
