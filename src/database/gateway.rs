//! Key-value storage gateway.
//!
//! Mirrors the two storage areas a browser extension sees: `local` holds the
//! authoritative bookmark list and settings, `sync` holds per-bookmark
//! mirror entries. Every call is a single statement, so each get or set is
//! atomic on its own; nothing spans a read-modify-write cycle.

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::connection::Database;
use crate::types::errors::StorageError;

/// Key holding the ordered bookmark list in the local area.
pub const BOOKMARKS_KEY: &str = "bookmarks";
/// Key holding the settings record in the local area.
pub const SETTINGS_KEY: &str = "settings";
/// Prefix of per-bookmark entries in the sync area.
pub const SYNC_KEY_PREFIX: &str = "bookmark_";

/// Logical storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Sync,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

/// Trait defining key-value persistence operations.
pub trait StorageGateway: Send + Sync {
    fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, area: StorageArea, key: &str, value: &Value) -> Result<(), StorageError>;
    fn remove(&self, area: StorageArea, key: &str) -> Result<(), StorageError>;
    /// Lists keys in `area` starting with `prefix`, sorted.
    fn keys_with_prefix(&self, area: StorageArea, prefix: &str) -> Result<Vec<String>, StorageError>;
}

impl StorageGateway for Database {
    fn get(&self, area: StorageArea, key: &str) -> Result<Option<Value>, StorageError> {
        let conn = self.connection()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE area = ?1 AND key = ?2",
                params![area.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&self, area: StorageArea, key: &str, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO kv_store (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(area, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![area.as_str(), key, text, now],
        )?;
        Ok(())
    }

    fn remove(&self, area: StorageArea, key: &str) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "DELETE FROM kv_store WHERE area = ?1 AND key = ?2",
            params![area.as_str(), key],
        )?;
        Ok(())
    }

    fn keys_with_prefix(&self, area: StorageArea, prefix: &str) -> Result<Vec<String>, StorageError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT key FROM kv_store WHERE area = ?1 AND substr(key, 1, ?2) = ?3 ORDER BY key",
        )?;
        let prefix_len = prefix.chars().count() as i64;
        let rows = stmt.query_map(params![area.as_str(), prefix_len, prefix], |row| {
            row.get::<_, String>(0)
        })?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}
