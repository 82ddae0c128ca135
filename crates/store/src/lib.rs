//! Token storage backends for persisting OAuth tokens.
//!
//! Provides an in-memory store for testing and a SQLite-backed store for
//! keeping tokens across process restarts. Both honour the per-key TTL.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryTokenStore;
pub use sqlite::SqliteTokenStore;
