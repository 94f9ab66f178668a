//! Sync-area mirror of the bookmark list.
//!
//! Each bookmark is copied to `sync/bookmark_<id>` while `autoSync` is on.
//! The background pass rewrites every entry and drops entries whose
//! bookmark no longer exists. Its errors are logged and never propagate.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::database::{StorageArea, StorageGateway, BOOKMARKS_KEY, SETTINGS_KEY, SYNC_KEY_PREFIX};
use crate::types::bookmark::Bookmark;
use crate::types::errors::StorageError;
use crate::types::settings::Settings;

pub fn sync_key(id: &str) -> String {
    format!("{}{}", SYNC_KEY_PREFIX, id)
}

pub struct SyncMirror {
    storage: Arc<dyn StorageGateway>,
}

impl SyncMirror {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    pub fn mirror_one(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        let value = serde_json::to_value(bookmark)?;
        self.storage.set(StorageArea::Sync, &sync_key(&bookmark.id), &value)
    }

    pub fn forget(&self, id: &str) -> Result<(), StorageError> {
        self.storage.remove(StorageArea::Sync, &sync_key(id))
    }

    /// Writes every bookmark and removes stale entries. Returns the number written.
    pub fn mirror_all(&self, bookmarks: &[Bookmark]) -> Result<usize, StorageError> {
        for bookmark in bookmarks {
            self.mirror_one(bookmark)?;
        }

        let live: Vec<String> = bookmarks.iter().map(|b| sync_key(&b.id)).collect();
        for key in self.storage.keys_with_prefix(StorageArea::Sync, SYNC_KEY_PREFIX)? {
            if !live.contains(&key) {
                self.storage.remove(StorageArea::Sync, &key)?;
            }
        }
        Ok(bookmarks.len())
    }

    /// One background pass: reads settings and bookmarks straight from storage.
    /// Returns `Ok(None)` when `autoSync` is off.
    pub fn run_pass(&self) -> Result<Option<usize>, StorageError> {
        let settings: Settings = match self.storage.get(StorageArea::Local, SETTINGS_KEY)? {
            Some(value) => serde_json::from_value(value)?,
            None => Settings::default(),
        };
        if !settings.auto_sync {
            return Ok(None);
        }

        let bookmarks: Vec<Bookmark> = match self.storage.get(StorageArea::Local, BOOKMARKS_KEY)? {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        self.mirror_all(&bookmarks).map(Some)
    }
}

/// Spawns the fixed-interval background sync on the current tokio runtime.
///
/// Each pass touches SQLite, so it runs on the blocking pool.
pub fn spawn_periodic(storage: Arc<dyn StorageGateway>, interval: Duration) -> JoinHandle<()> {
    let mirror = Arc::new(SyncMirror::new(storage));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let pass = Arc::clone(&mirror);
            match tokio::task::spawn_blocking(move || pass.run_pass()).await {
                Ok(Ok(Some(count))) => debug!(count, "periodic sync complete"),
                Ok(Ok(None)) => debug!("periodic sync skipped, autoSync is off"),
                Ok(Err(e)) => warn!(error = %e, "periodic sync failed"),
                Err(e) => warn!(error = %e, "periodic sync task panicked"),
            }
        }
    })
}
