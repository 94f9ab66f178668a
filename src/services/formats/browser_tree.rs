use super::from_epoch_millis;
use crate::types::bookmark::{new_bookmark_id, now_timestamp, Bookmark, BookmarkSource, Category, UNTITLED};
use crate::types::transfer::BrowserBookmarkNode;

pub const IMPORT_DESCRIPTION: &str = "Imported from browser";
pub const IMPORT_TAGS: [&str; 2] = ["imported", "browser"];

/// Flattens a browser's bookmark tree depth-first; folders contribute only their children.
pub fn flatten_browser_tree(nodes: &[BrowserBookmarkNode]) -> Vec<Bookmark> {
    let mut out = Vec::new();
    for node in nodes {
        visit(node, &mut out);
    }
    out
}

fn visit(node: &BrowserBookmarkNode, out: &mut Vec<Bookmark>) {
    if let Some(url) = node.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        let title = node
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED);
        out.push(Bookmark {
            id: new_bookmark_id(),
            url: url.to_string(),
            title: title.to_string(),
            description: IMPORT_DESCRIPTION.to_string(),
            image: String::new(),
            tags: IMPORT_TAGS.iter().map(|t| t.to_string()).collect(),
            category: Category::Other,
            created_at: node
                .date_added
                .filter(|ms| ms.is_finite())
                .and_then(|ms| from_epoch_millis(ms as i64))
                .unwrap_or_else(now_timestamp),
            is_favorite: false,
            source: BookmarkSource::Browser,
        });
    }
    for child in node.children.iter().flatten() {
        visit(child, out);
    }
}
