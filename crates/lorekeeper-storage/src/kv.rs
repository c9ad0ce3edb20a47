//! Keyed blob store.
//!
//! One string value per key, overwritten whole on every write.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use lorekeeper_core::error::LorekeeperError;

use crate::db::Database;

/// String-valued key/value store backed by the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvStore {
    db: Arc<Database>,
}

impl KvStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Read the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, LorekeeperError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| LorekeeperError::Storage(format!("kv get failed: {}", e)))
        })
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), LorekeeperError> {
        let now = chrono::Utc::now().timestamp();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| LorekeeperError::Storage(format!("kv set failed: {}", e)))?;
            Ok(())
        })
    }

    /// Delete `key`. Returns whether a value was present.
    pub fn remove(&self, key: &str) -> Result<bool, LorekeeperError> {
        self.db.with_conn(|conn| {
            let deleted = conn
                .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .map_err(|e| LorekeeperError::Storage(format!("kv remove failed: {}", e)))?;
            Ok(deleted > 0)
        })
    }
}
