//! Builders for the one-click save paths: current page, a link under the
//! cursor, a text selection containing a URL, and auto-save.
//!
//! Builders never touch storage. The result goes through the collection's
//! `add`, which validates it and rejects URLs already saved.

use std::sync::OnceLock;

use regex::Regex;

use crate::services::tag_heuristics::{hostname, quick_tags, FALLBACK_TAG};
use crate::types::bookmark::{Bookmark, BookmarkSource, Category};
use crate::types::settings::Settings;

/// Selections longer than this are truncated in the title.
pub const SELECTION_TITLE_LIMIT: usize = 100;

pub const SELECTION_TAG: &str = "selected text";

fn url_in_text() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("url pattern is valid"))
}

/// Host for display in descriptions; the raw string when it has none.
fn host_label(url: &str) -> String {
    hostname(url).unwrap_or_else(|| url.trim().to_string())
}

/// Captures the page currently being viewed.
pub fn page_capture(
    url: &str,
    title: &str,
    fav_icon: Option<&str>,
    category: Category,
    source: BookmarkSource,
) -> Bookmark {
    let mut bookmark = Bookmark::new(url, title, source);
    bookmark.description = format!("Saved from {}", host_label(url));
    bookmark.image = fav_icon.unwrap_or_default().trim().to_string();
    bookmark.tags = quick_tags(url);
    bookmark.category = category;
    bookmark.normalized()
}

/// Captures a link found on `page_url`; the link text becomes the title.
pub fn link_capture(link_url: &str, link_text: Option<&str>, page_url: &str, category: Category) -> Bookmark {
    let title = link_text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(link_url.trim());
    let mut bookmark = Bookmark::new(link_url, title, BookmarkSource::ContextMenu);
    bookmark.description = format!("Link saved from {}", host_label(page_url));
    bookmark.tags = quick_tags(link_url);
    bookmark.category = category;
    bookmark.normalized()
}

/// Captures the first URL in a text selection. `None` when it has no link.
pub fn selection_capture(selection: &str, page_url: &str, category: Category) -> Option<Bookmark> {
    let url = url_in_text().find(selection)?.as_str();
    let mut bookmark = Bookmark::new(url, &selection_title(selection), BookmarkSource::ContextMenu);
    bookmark.description = format!("Selected text from {}", host_label(page_url));
    bookmark.tags = vec![SELECTION_TAG.to_string(), FALLBACK_TAG.to_string()];
    bookmark.category = category;
    Some(bookmark.normalized())
}

fn selection_title(selection: &str) -> String {
    let count = selection.chars().count();
    if count > SELECTION_TITLE_LIMIT {
        let head: String = selection.chars().take(SELECTION_TITLE_LIMIT).collect();
        format!("{}...", head)
    } else {
        selection.to_string()
    }
}

/// True when the URL's host is one of the configured auto-save domains.
pub fn should_auto_save(url: &str, settings: &Settings) -> bool {
    let Some(host) = hostname(url) else {
        return false;
    };
    settings
        .auto_save_domains
        .iter()
        .any(|domain| domain.trim().eq_ignore_ascii_case(&host))
}

/// Page capture tagged as auto-saved, or `None` when the host is not listed.
pub fn auto_save_capture(url: &str, title: &str, fav_icon: Option<&str>, settings: &Settings) -> Option<Bookmark> {
    if !should_auto_save(url, settings) {
        return None;
    }
    Some(page_capture(
        url,
        title,
        fav_icon,
        settings.default_category,
        BookmarkSource::AutoSave,
    ))
}
