//! Key-value storage backends
//!
//! The facade only ever sees the [`KeyValueStore`] seam; which backend sits
//! behind it (or none at all) is the host application's choice. Two
//! implementations ship here: an in-memory map and a SQLite-backed store
//! with embedded migrations.

use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Minimal key-value collaborator surface.
///
/// Implementations are expected not to fail for well-formed input; a
/// backend that loses a write degrades consent persistence, nothing more.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, overwriting prior contents
    fn set(&mut self, key: &str, value: &str);
}

// ============================================
// In-memory store
// ============================================

/// HashMap-backed store for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

// ============================================
// SQLite store
// ============================================

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: single key-value table
    r#"
    CREATE TABLE IF NOT EXISTS kv (
        key    TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    );
    "#,
];

/// SQLite-backed store for durable consent state
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Apply pending migrations tracked via PRAGMA user_version
    fn migrate(&self) -> Result<()> {
        let current: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        for version in current..SCHEMA_VERSION {
            let migration = MIGRATIONS[version as usize];
            tracing::debug!(from = version, to = version + 1, "applying store migration");
            self.conn.execute_batch(migration)?;
            self.conn
                .pragma_update(None, "user_version", version + 1)?;
        }

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "store read failed");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let result = self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        );

        if let Err(e) = result {
            tracing::warn!(key = %key, error = %e, "store write failed");
        }
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").is_none());

        store.set("k", "v1");
        assert_eq!(store.get("k").as_deref(), Some("v1"));

        store.set("k", "v2");
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("k").is_none());

        store.set("k", "v1");
        store.set("k", "v2");
        assert_eq!(store.get("k").as_deref(), Some("v2"));
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("k", "persisted");
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("persisted"));
    }
}
