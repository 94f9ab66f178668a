//! JSON export envelope and tolerant JSON import.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{rfc3339, FormatCodec};
use crate::types::bookmark::{
    new_bookmark_id, normalize_tags, now_timestamp, Bookmark, BookmarkSource, Category, UNTITLED,
};
use crate::types::errors::TransferError;
use crate::types::transfer::TransferFormat;

pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    version: &'static str,
    export_date: String,
    total_bookmarks: usize,
    bookmarks: Vec<ExportedBookmark<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedBookmark<'a> {
    #[serde(flatten)]
    bookmark: &'a Bookmark,
    exported_at: &'a str,
}

pub struct JsonCodec;

impl FormatCodec for JsonCodec {
    fn format(&self) -> TransferFormat {
        TransferFormat::Json
    }

    fn export(&self, bookmarks: &[Bookmark]) -> Result<String, TransferError> {
        let now = rfc3339(Utc::now());
        let envelope = ExportEnvelope {
            version: EXPORT_VERSION,
            export_date: now.clone(),
            total_bookmarks: bookmarks.len(),
            bookmarks: bookmarks
                .iter()
                .map(|bookmark| ExportedBookmark { bookmark, exported_at: &now })
                .collect(),
        };
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| TransferError::Serialization(e.to_string()))
    }

    fn parse(&self, content: &str) -> Result<Vec<Bookmark>, TransferError> {
        let root: Value = serde_json::from_str(content.trim_start_matches('\u{feff}'))
            .map_err(|e| TransferError::InvalidJson(e.to_string()))?;

        let records = match &root {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("bookmarks") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(TransferError::InvalidFormat(
                        "expected a \"bookmarks\" array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(TransferError::InvalidFormat(
                    "expected an object or an array of bookmarks".to_string(),
                ))
            }
        };

        Ok(records
            .iter()
            .filter_map(Value::as_object)
            .filter_map(record_from_object)
            .collect())
    }
}

fn record_from_object(obj: &Map<String, Value>) -> Option<Bookmark> {
    let url = obj
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())?;

    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let title = text("title");
    let tags = match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse)
        .unwrap_or_default();
    let created_at = obj
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(super::parse_date)
        .unwrap_or_else(now_timestamp);

    Some(Bookmark {
        id: new_bookmark_id(),
        url: url.to_string(),
        title: if title.trim().is_empty() { UNTITLED.to_string() } else { title.trim().to_string() },
        description: text("description"),
        image: text("image"),
        tags: normalize_tags(tags),
        category,
        created_at,
        is_favorite: obj.get("isFavorite").is_some_and(is_truthy),
        source: BookmarkSource::ImportedJson,
    })
}

/// Loose truthiness for flags written by hand or by other tools.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
