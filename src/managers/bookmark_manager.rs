//! Bookmark Collection for linkvault.
//!
//! Implements `BookmarkCollectionTrait`: the ordered, URL-unique list of
//! bookmarks, newest first. The whole list is written to `local/bookmarks`
//! after every mutation. When that write fails the in-memory change is
//! kept and `BookmarkError::Persistence` is returned.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::database::{StorageArea, StorageGateway, BOOKMARKS_KEY};
use crate::services::tag_heuristics::is_valid_url;
use crate::types::bookmark::{
    new_bookmark_id, normalize_tags, Bookmark, BookmarkDraft, BookmarkPatch, BookmarkSource, Category,
    CollectionStats, Filter,
};
use crate::types::errors::BookmarkError;
use crate::types::transfer::ImportSummary;

/// Trait defining bookmark collection operations.
pub trait BookmarkCollectionTrait {
    fn load(&mut self) -> Result<usize, BookmarkError>;
    fn all(&self) -> &[Bookmark];
    fn get(&self, id: &str) -> Option<&Bookmark>;
    fn add(&mut self, bookmark: Bookmark) -> Result<Bookmark, BookmarkError>;
    fn add_draft(&mut self, draft: BookmarkDraft, default_category: Category) -> Result<Bookmark, BookmarkError>;
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    fn remove(&mut self, id: &str) -> Result<Bookmark, BookmarkError>;
    /// Flips the favorite flag. Returns the new value.
    fn toggle_favorite(&mut self, id: &str) -> Result<bool, BookmarkError>;
    /// Moves `dragged_id` to the position `target_id` held before the move.
    fn reorder(&mut self, dragged_id: &str, target_id: &str) -> Result<(), BookmarkError>;
    fn search(&self, query: &str) -> Vec<Bookmark>;
    fn filter(&self, filter: Filter) -> Vec<Bookmark>;
    /// Search, then filter. An empty query matches everything.
    fn view(&self, query: Option<&str>, filter: Filter) -> Vec<Bookmark>;
    fn recent(&self, limit: usize) -> Vec<Bookmark>;
    fn stats(&self) -> CollectionStats;
    fn contains_url(&self, url: &str) -> bool;
    /// Prepends the candidates whose URL is new, in batch order, and persists once.
    fn merge(&mut self, candidates: Vec<Bookmark>) -> Result<ImportSummary, BookmarkError>;
}

/// Bookmark collection persisted through a storage gateway.
pub struct BookmarkCollection {
    storage: Arc<dyn StorageGateway>,
    bookmarks: Vec<Bookmark>,
}

impl BookmarkCollection {
    /// Creates an empty collection; call `load` to read the stored list.
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self {
            storage,
            bookmarks: Vec::new(),
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.bookmarks.iter().position(|b| b.id == id)
    }

    fn require_index(&self, id: &str) -> Result<usize, BookmarkError> {
        self.index_of(id)
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    fn persist(&self) -> Result<(), BookmarkError> {
        let value = serde_json::to_value(&self.bookmarks)
            .map_err(|e| BookmarkError::Persistence(e.to_string()))?;
        self.storage
            .set(StorageArea::Local, BOOKMARKS_KEY, &value)
            .map_err(|e| {
                error!(error = %e, count = self.bookmarks.len(), "failed to persist bookmarks");
                BookmarkError::from(e)
            })
    }

    fn validate_url(url: &str) -> Result<(), BookmarkError> {
        if url.trim().is_empty() {
            return Err(BookmarkError::Validation("URL is required".to_string()));
        }
        if !is_valid_url(url) {
            return Err(BookmarkError::Validation(format!("URL is not absolute: {}", url)));
        }
        Ok(())
    }

    /// A fresh id when `id` is empty or already taken.
    fn unique_id(&self, id: String) -> String {
        if id.trim().is_empty() || self.index_of(&id).is_some() {
            let mut fresh = new_bookmark_id();
            while self.index_of(&fresh).is_some() {
                fresh = new_bookmark_id();
            }
            fresh
        } else {
            id
        }
    }
}

fn matches_query(bookmark: &Bookmark, needle: &str) -> bool {
    bookmark.title.to_lowercase().contains(needle)
        || bookmark.description.to_lowercase().contains(needle)
        || bookmark.url.to_lowercase().contains(needle)
        || bookmark.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn apply_filter(bookmarks: Vec<Bookmark>, filter: Filter) -> Vec<Bookmark> {
    match filter {
        Filter::All => bookmarks,
        Filter::Recent => bookmarks.into_iter().take(Filter::RECENT_LIMIT).collect(),
        Filter::Favorites => bookmarks.into_iter().filter(|b| b.is_favorite).collect(),
    }
}

impl BookmarkCollectionTrait for BookmarkCollection {
    /// Replaces the in-memory list with the stored one. Returns the count loaded.
    ///
    /// Stored entries that cannot be read as bookmarks are skipped.
    fn load(&mut self) -> Result<usize, BookmarkError> {
        let stored = self.storage.get(StorageArea::Local, BOOKMARKS_KEY)?;
        let entries = match stored {
            Some(Value::Array(items)) => items,
            Some(_) => {
                warn!("stored bookmark list is not an array, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut bookmarks = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Bookmark>(entry) {
                Ok(bookmark) => bookmarks.push(bookmark.normalized()),
                Err(e) => warn!(error = %e, "skipping unreadable stored bookmark"),
            }
        }
        self.bookmarks = bookmarks;
        debug!(count = self.bookmarks.len(), "bookmarks loaded");
        Ok(self.bookmarks.len())
    }

    fn all(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    fn get(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    fn add(&mut self, bookmark: Bookmark) -> Result<Bookmark, BookmarkError> {
        let mut bookmark = bookmark.normalized();
        Self::validate_url(&bookmark.url)?;
        if self.contains_url(&bookmark.url) {
            return Err(BookmarkError::DuplicateUrl(bookmark.url));
        }
        bookmark.id = self.unique_id(bookmark.id);

        self.bookmarks.insert(0, bookmark.clone());
        debug!(id = %bookmark.id, url = %bookmark.url, "bookmark added");
        self.persist()?;
        Ok(bookmark)
    }

    fn add_draft(&mut self, draft: BookmarkDraft, default_category: Category) -> Result<Bookmark, BookmarkError> {
        if draft.title.trim().is_empty() {
            return Err(BookmarkError::Validation("Title is required".to_string()));
        }
        Self::validate_url(&draft.url)?;

        let mut bookmark = Bookmark::new(&draft.url, &draft.title, BookmarkSource::Manual);
        bookmark.description = draft.description.trim().to_string();
        bookmark.image = draft.image.trim().to_string();
        bookmark.tags = draft.tags;
        bookmark.category = draft.category.unwrap_or(default_category);
        self.add(bookmark)
    }

    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let index = self.require_index(id)?;

        if let Some(url) = patch.url.as_deref().map(str::trim) {
            Self::validate_url(url)?;
            let taken = self
                .bookmarks
                .iter()
                .any(|b| b.id != id && b.url == url);
            if taken {
                return Err(BookmarkError::DuplicateUrl(url.to_string()));
            }
        }
        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(BookmarkError::Validation("Title is required".to_string()));
            }
        }

        let bookmark = &mut self.bookmarks[index];
        if let Some(url) = patch.url {
            bookmark.url = url.trim().to_string();
        }
        if let Some(title) = patch.title {
            bookmark.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            bookmark.description = description;
        }
        if let Some(image) = patch.image {
            bookmark.image = image;
        }
        if let Some(tags) = patch.tags {
            bookmark.tags = normalize_tags(tags);
        }
        if let Some(category) = patch.category {
            bookmark.category = category;
        }
        if let Some(is_favorite) = patch.is_favorite {
            bookmark.is_favorite = is_favorite;
        }
        let updated = bookmark.clone();

        self.persist()?;
        Ok(updated)
    }

    fn remove(&mut self, id: &str) -> Result<Bookmark, BookmarkError> {
        let index = self.require_index(id)?;
        let removed = self.bookmarks.remove(index);
        debug!(id, "bookmark removed");
        self.persist()?;
        Ok(removed)
    }

    fn toggle_favorite(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let index = self.require_index(id)?;
        let bookmark = &mut self.bookmarks[index];
        bookmark.is_favorite = !bookmark.is_favorite;
        let value = bookmark.is_favorite;
        self.persist()?;
        Ok(value)
    }

    fn reorder(&mut self, dragged_id: &str, target_id: &str) -> Result<(), BookmarkError> {
        if dragged_id == target_id {
            return Ok(());
        }
        let from = self.require_index(dragged_id)?;
        let to = self.require_index(target_id)?;

        let dragged = self.bookmarks.remove(from);
        self.bookmarks.insert(to.min(self.bookmarks.len()), dragged);
        self.persist()
    }

    fn search(&self, query: &str) -> Vec<Bookmark> {
        let needle = query.trim().to_lowercase();
        self.bookmarks
            .iter()
            .filter(|b| needle.is_empty() || matches_query(b, &needle))
            .cloned()
            .collect()
    }

    fn filter(&self, filter: Filter) -> Vec<Bookmark> {
        apply_filter(self.bookmarks.clone(), filter)
    }

    fn view(&self, query: Option<&str>, filter: Filter) -> Vec<Bookmark> {
        let searched = match query {
            Some(q) => self.search(q),
            None => self.bookmarks.clone(),
        };
        apply_filter(searched, filter)
    }

    fn recent(&self, limit: usize) -> Vec<Bookmark> {
        self.bookmarks.iter().take(limit).cloned().collect()
    }

    fn stats(&self) -> CollectionStats {
        let tags: HashSet<&str> = self
            .bookmarks
            .iter()
            .flat_map(|b| b.tags.iter().map(String::as_str))
            .collect();
        let categories: HashSet<Category> = self.bookmarks.iter().map(|b| b.category).collect();

        CollectionStats {
            total_bookmarks: self.bookmarks.len(),
            total_tags: tags.len(),
            total_categories: categories.len(),
            total_favorites: self.bookmarks.iter().filter(|b| b.is_favorite).count(),
        }
    }

    fn contains_url(&self, url: &str) -> bool {
        let url = url.trim();
        self.bookmarks.iter().any(|b| b.url == url)
    }

    fn merge(&mut self, candidates: Vec<Bookmark>) -> Result<ImportSummary, BookmarkError> {
        let total = candidates.len();
        let mut seen: HashSet<String> = self.bookmarks.iter().map(|b| b.url.clone()).collect();
        let mut fresh = Vec::new();

        for candidate in candidates {
            let mut candidate = candidate.normalized();
            if candidate.url.is_empty() || !seen.insert(candidate.url.clone()) {
                continue;
            }
            candidate.id = self.unique_id(candidate.id);
            fresh.push(candidate);
        }

        let summary = ImportSummary {
            imported: fresh.len(),
            duplicates: total - fresh.len(),
            total,
        };
        if fresh.is_empty() {
            return Ok(summary);
        }

        self.bookmarks.splice(0..0, fresh);
        debug!(imported = summary.imported, duplicates = summary.duplicates, "import merged");
        self.persist()?;
        Ok(summary)
    }
}
