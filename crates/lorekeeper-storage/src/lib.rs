//! Lorekeeper storage crate: SQLite persistence for the chat history.
//!
//! Provides a WAL-mode SQLite database with migrations, a keyed blob store,
//! and the history log built on top of it.

pub mod db;
pub mod history;
pub mod kv;
pub mod migrations;

pub use db::Database;
pub use history::HistoryStore;
pub use kv::KvStore;
