//! App Core for linkvault.
//!
//! Central struct holding the storage, the bookmark collection and the
//! services every presentation surface (RPC server, CLI) works through.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{Database, StorageGateway};
use crate::managers::bookmark_manager::{BookmarkCollection, BookmarkCollectionTrait};
use crate::services::formats::{self, codec_for, flatten_browser_tree};
use crate::services::metadata_fetcher::MetadataFetcher;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::sync_mirror::SyncMirror;
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch, Category};
use crate::types::errors::{BookmarkError, TransferError};
use crate::types::settings::Settings;
use crate::types::transfer::{BrowserBookmarkNode, ExportFile, ImportSummary, TransferFormat};

/// Central application struct holding all managers and services.
pub struct App {
    pub db: Arc<Database>,
    pub config: AppConfig,
    pub settings_engine: SettingsEngine,
    pub collection: BookmarkCollection,
    pub fetcher: MetadataFetcher,
    pub sync: SyncMirror,
}

impl App {
    /// Opens the database under `config.data_dir` and loads stored state.
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(&config.data_dir)?;
        let db = Database::open(config.database_path())?;
        let fetcher = MetadataFetcher::new(&config.metadata)?;
        Self::with_parts(db, config, fetcher)
    }

    /// Builds the app from an already opened database and fetcher.
    pub fn with_parts(
        db: Database,
        config: AppConfig,
        fetcher: MetadataFetcher,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(db);
        let storage: Arc<dyn StorageGateway> = db.clone();

        let mut settings_engine = SettingsEngine::new(storage.clone());
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "failed to load settings, using defaults");
        }

        let mut collection = BookmarkCollection::new(storage.clone());
        collection
            .load()
            .map_err(|e| format!("BookmarkCollection init failed: {}", e))?;

        info!(
            bookmarks = collection.all().len(),
            data_dir = %config.data_dir.display(),
            "linkvault ready"
        );

        Ok(Self {
            db,
            config,
            settings_engine,
            collection,
            fetcher,
            sync: SyncMirror::new(storage),
        })
    }

    /// An app over an in-memory database with no network access.
    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_parts(Database::open_in_memory()?, AppConfig::default(), MetadataFetcher::offline())
    }

    pub fn settings(&self) -> &Settings {
        self.settings_engine.get_settings()
    }

    pub fn default_category(&self) -> Category {
        self.settings().default_category
    }

    pub fn storage(&self) -> Arc<dyn StorageGateway> {
        self.db.clone()
    }

    fn mirror(&self, bookmark: &Bookmark) {
        if !self.settings().auto_sync {
            return;
        }
        if let Err(e) = self.sync.mirror_one(bookmark) {
            warn!(id = %bookmark.id, error = %e, "failed to mirror bookmark to sync storage");
        }
    }

    /// Adds a bookmark and mirrors it to the sync area when `autoSync` is on.
    pub fn save_bookmark(&mut self, bookmark: Bookmark) -> Result<Bookmark, BookmarkError> {
        let saved = self.collection.add(bookmark)?;
        self.mirror(&saved);
        Ok(saved)
    }

    /// Validates and adds a hand-entered bookmark, mirroring it like `save_bookmark`.
    pub fn save_draft(&mut self, draft: BookmarkDraft) -> Result<Bookmark, BookmarkError> {
        let category = self.default_category();
        let saved = self.collection.add_draft(draft, category)?;
        self.mirror(&saved);
        Ok(saved)
    }

    pub fn update_bookmark(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let updated = self.collection.update(id, patch)?;
        self.mirror(&updated);
        Ok(updated)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let value = self.collection.toggle_favorite(id)?;
        if let Some(bookmark) = self.collection.get(id) {
            self.mirror(bookmark);
        }
        Ok(value)
    }

    /// Removes a bookmark and its sync-area entry.
    pub fn delete_bookmark(&mut self, id: &str) -> Result<Bookmark, BookmarkError> {
        let removed = self.collection.remove(id)?;
        if let Err(e) = self.sync.forget(id) {
            warn!(id, error = %e, "failed to remove bookmark from sync storage");
        }
        Ok(removed)
    }

    /// Parses `content` in `format` and merges the records.
    pub fn import_content(&mut self, format: TransferFormat, content: &str) -> Result<ImportSummary, TransferError> {
        let candidates = codec_for(format).parse(content)?;
        let summary = self.collection.merge(candidates)?;
        info!(%format, imported = summary.imported, duplicates = summary.duplicates, "import finished");
        Ok(summary)
    }

    pub fn import_browser_tree(&mut self, nodes: &[BrowserBookmarkNode]) -> Result<ImportSummary, BookmarkError> {
        self.collection.merge(flatten_browser_tree(nodes))
    }

    /// Reads and imports a file; the format defaults to the file extension.
    pub fn import_file(&mut self, path: &Path, format: Option<TransferFormat>) -> Result<ImportSummary, TransferError> {
        let format = match format {
            Some(f) => f,
            None => TransferFormat::from_path(path)?,
        };
        let content = fs::read_to_string(path)?;
        self.import_content(format, &content)
    }

    pub fn export(&self, format: TransferFormat) -> Result<ExportFile, TransferError> {
        let content = codec_for(format).export(self.collection.all())?;
        Ok(ExportFile {
            file_name: formats::file_name(format, chrono::Utc::now().date_naive()),
            mime_type: format.mime_type().to_string(),
            content,
        })
    }

    /// Writes `bookmarks-<date>.<ext>` into `dir` and returns its path.
    pub fn export_to(&self, dir: &Path, format: TransferFormat) -> Result<PathBuf, TransferError> {
        let file = self.export(format)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(&file.file_name);
        fs::write(&path, file.content)?;
        info!(path = %path.display(), "export written");
        Ok(path)
    }
}
