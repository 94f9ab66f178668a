//! Standalone HTML export and anchor-scanning HTML import.

use std::fmt::Write as _;

use chrono::Utc;

use super::{escape_html, from_epoch_secs, FormatCodec};
use crate::services::html_meta::extract_anchors;
use crate::services::tag_heuristics::is_valid_url;
use crate::types::bookmark::{new_bookmark_id, now_timestamp, Bookmark, BookmarkSource, Category, UNTITLED};
use crate::types::errors::TransferError;
use crate::types::transfer::TransferFormat;

pub const IMPORT_DESCRIPTION: &str = "Imported from HTML file";
pub const IMPORT_TAGS: [&str; 2] = ["imported", "html"];

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; margin: 2rem; background: #f8f9fa; color: #333; }
        .header { text-align: center; margin-bottom: 2rem; padding: 2rem; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; border-radius: 10px; }
        .category { margin-bottom: 2rem; background: white; border-radius: 10px; padding: 1.5rem; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .category h2 { color: #667eea; border-bottom: 2px solid #667eea; padding-bottom: 0.5rem; margin-bottom: 1rem; }
        .bookmark { margin-bottom: 1rem; padding: 1rem; border: 1px solid #e9ecef; border-radius: 5px; background: #f8f9fa; }
        .bookmark-title { font-weight: bold; margin-bottom: 0.5rem; }
        .bookmark-url { color: #667eea; text-decoration: none; margin-bottom: 0.5rem; display: block; }
        .bookmark-description { color: #6c757d; font-size: 0.9rem; margin-bottom: 0.5rem; }
        .tag { background: #667eea; color: white; padding: 0.2rem 0.5rem; border-radius: 3px; margin-right: 0.25rem; font-size: 0.8rem; }
        .favorite { color: #dc3545; font-weight: bold; }
        .stats { text-align: center; margin-bottom: 1rem; }
"#;

pub struct HtmlCodec;

impl FormatCodec for HtmlCodec {
    fn format(&self) -> TransferFormat {
        TransferFormat::Html
    }

    fn export(&self, bookmarks: &[Bookmark]) -> Result<String, TransferError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut html = String::new();

        // fmt::Write into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
             <title>Saved Links</title>\n    <style>{}    </style>\n</head>\n<body>\n    \
             <div class=\"header\">\n        <h1>Saved Links</h1>\n        \
             <div class=\"stats\">Exported: {} | Total links: {}</div>\n    </div>\n",
            STYLE,
            today,
            bookmarks.len()
        );

        for (category, group) in group_by_category(bookmarks) {
            let _ = write!(
                html,
                "    <div class=\"category\">\n        <h2>{} ({})</h2>\n",
                category.display_name(),
                group.len()
            );
            for bookmark in group {
                write_entry(&mut html, bookmark);
            }
            html.push_str("    </div>\n");
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    fn parse(&self, content: &str) -> Result<Vec<Bookmark>, TransferError> {
        let records: Vec<Bookmark> = extract_anchors(content)
            .into_iter()
            .filter(|anchor| is_valid_url(&anchor.href))
            .map(|anchor| {
                let title = if !anchor.text.is_empty() {
                    anchor.text
                } else {
                    anchor.title.unwrap_or_else(|| UNTITLED.to_string())
                };
                Bookmark {
                    id: new_bookmark_id(),
                    url: anchor.href,
                    title,
                    description: IMPORT_DESCRIPTION.to_string(),
                    image: String::new(),
                    tags: IMPORT_TAGS.iter().map(|t| t.to_string()).collect(),
                    category: Category::Other,
                    created_at: anchor
                        .add_date
                        .and_then(from_epoch_secs)
                        .unwrap_or_else(now_timestamp),
                    is_favorite: false,
                    source: BookmarkSource::ImportedHtml,
                }
            })
            .collect();

        if records.is_empty() {
            return Err(TransferError::NoValidLinks);
        }
        Ok(records)
    }
}

fn write_entry(html: &mut String, bookmark: &Bookmark) {
    let favorite = if bookmark.is_favorite {
        " <span class=\"favorite\">★</span>"
    } else {
        ""
    };
    let url = escape_html(&bookmark.url);
    let _ = write!(
        html,
        "        <div class=\"bookmark\">\n            \
         <div class=\"bookmark-title\">{}{}</div>\n            \
         <a href=\"{}\" class=\"bookmark-url\" target=\"_blank\">{}</a>\n",
        escape_html(&bookmark.title),
        favorite,
        url,
        url
    );
    if !bookmark.description.is_empty() {
        let _ = writeln!(
            html,
            "            <div class=\"bookmark-description\">{}</div>",
            escape_html(&bookmark.description)
        );
    }
    if !bookmark.tags.is_empty() {
        let chips: String = bookmark
            .tags
            .iter()
            .map(|tag| format!("<span class=\"tag\">{}</span>", escape_html(tag)))
            .collect();
        let _ = writeln!(html, "            <div class=\"bookmark-tags\">{}</div>", chips);
    }
    html.push_str("        </div>\n");
}

/// Groups bookmarks by category, categories in order of first appearance.
fn group_by_category(bookmarks: &[Bookmark]) -> Vec<(Category, Vec<&Bookmark>)> {
    let mut groups: Vec<(Category, Vec<&Bookmark>)> = Vec::new();
    for bookmark in bookmarks {
        match groups.iter_mut().find(|(c, _)| *c == bookmark.category) {
            Some((_, group)) => group.push(bookmark),
            None => groups.push((bookmark.category, vec![bookmark])),
        }
    }
    groups
}
