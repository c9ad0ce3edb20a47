//! Persisted chat history.
//!
//! The whole history lives in one keyed blob holding a JSON array of turns.
//! Every append reads the blob, pushes the turn, and writes it back.
//!
//! Appends are serialized within one process. Two processes sharing the same
//! database file can still lose writes: the last writer replaces the whole
//! blob.

use std::sync::Mutex;

use tracing::{debug, warn};

use lorekeeper_core::error::LorekeeperError;
use lorekeeper_core::types::ChatTurn;

use crate::kv::KvStore;

/// Append-only log of chat turns stored under a single key.
#[derive(Debug)]
pub struct HistoryStore {
    kv: KvStore,
    key: String,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(kv: KvStore, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Load every stored turn in chronological order.
    ///
    /// A blob that fails to parse is logged and treated as empty; the next
    /// append overwrites it.
    pub fn load(&self) -> Result<Vec<ChatTurn>, LorekeeperError> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<ChatTurn>>(&raw) {
            Ok(turns) => Ok(turns),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored chat history is unreadable; starting fresh");
                Ok(Vec::new())
            }
        }
    }

    /// Append one turn and persist the full history.
    pub fn append(&self, turn: &ChatTurn) -> Result<usize, LorekeeperError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| LorekeeperError::Storage(format!("history lock poisoned: {}", e)))?;

        let mut turns = self.load()?;
        turns.push(turn.clone());
        let blob = serde_json::to_string(&turns)?;
        self.kv.set(&self.key, &blob)?;
        debug!(key = %self.key, len = turns.len(), "Chat history saved");
        Ok(turns.len())
    }

    /// Delete the stored history. Clearing an already empty history is a no-op.
    pub fn clear(&self) -> Result<(), LorekeeperError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| LorekeeperError::Storage(format!("history lock poisoned: {}", e)))?;
        self.kv.remove(&self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lorekeeper_core::types::Sender;

    use super::*;
    use crate::db::Database;

    fn history() -> HistoryStore {
        let kv = KvStore::new(Arc::new(Database::in_memory().unwrap()));
        HistoryStore::new(kv, "dnd_chat_history")
    }

    #[test]
    fn test_empty_history() {
        assert!(history().load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_reload_round_trip() {
        let store = history();
        let turns: Vec<ChatTurn> = (0..7)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("question {}", i))
                } else {
                    ChatTurn::bot(format!("answer {}", i))
                }
            })
            .collect();
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(store.append(turn).unwrap(), i + 1);
        }

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 7);
        for (stored, original) in loaded.iter().zip(&turns) {
            assert_eq!(stored.sender, original.sender);
            assert_eq!(stored.text, original.text);
            assert_eq!(stored.timestamp, original.timestamp);
        }
    }

    #[test]
    fn test_reload_from_new_store_on_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let kv = KvStore::new(Arc::new(Database::new(&path).unwrap()));
            let store = HistoryStore::new(kv, "h");
            store.append(&ChatTurn::user("hello")).unwrap();
            store.append(&ChatTurn::bot("hi there")).unwrap();
        }
        let kv = KvStore::new(Arc::new(Database::new(&path).unwrap()));
        let loaded = HistoryStore::new(kv, "h").load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].sender, Sender::User);
        assert_eq!(loaded[1].text, "hi there");
    }

    #[test]
    fn test_clear_twice_is_safe() {
        let store = history();
        store.append(&ChatTurn::user("hello")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_stored_blob_is_json_array() {
        let kv = KvStore::new(Arc::new(Database::in_memory().unwrap()));
        let store = HistoryStore::new(kv.clone(), "h");
        store.append(&ChatTurn::user("hello")).unwrap();
        let raw = kv.get("h").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["sender"], "user");
        assert_eq!(value[0]["text"], "hello");
    }

    #[test]
    fn test_corrupt_blob_treated_as_empty_and_overwritten() {
        let kv = KvStore::new(Arc::new(Database::in_memory().unwrap()));
        kv.set("h", "{not json").unwrap();
        let store = HistoryStore::new(kv, "h");
        assert!(store.load().unwrap().is_empty());
        store.append(&ChatTurn::bot("fresh")).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_in_process_are_not_lost() {
        let store = Arc::new(history());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.append(&ChatTurn::user(format!("m{}", i))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.load().unwrap().len(), 8);
    }
}
