//! Import/export engine.
//!
//! Each file format is an independent [`FormatCodec`]; [`codec_for`] selects
//! one by [`TransferFormat`]. Codecs only translate between text and
//! bookmark records. Deduplication against the live collection happens in
//! `BookmarkCollection::merge`.

pub mod browser_tree;
pub mod csv;
pub mod html;
pub mod json;

pub use browser_tree::flatten_browser_tree;
pub use csv::CsvCodec;
pub use html::HtmlCodec;
pub use json::JsonCodec;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::types::bookmark::Bookmark;
use crate::types::errors::TransferError;
use crate::types::transfer::TransferFormat;

/// Serializer/parser pair for one file format.
pub trait FormatCodec: Send + Sync {
    fn format(&self) -> TransferFormat;
    fn export(&self, bookmarks: &[Bookmark]) -> Result<String, TransferError>;
    /// Parses file content into fresh records. Ids are always newly generated.
    fn parse(&self, content: &str) -> Result<Vec<Bookmark>, TransferError>;
}

/// Returns the codec handling `format`.
pub fn codec_for(format: TransferFormat) -> Box<dyn FormatCodec> {
    match format {
        TransferFormat::Json => Box::new(JsonCodec),
        TransferFormat::Csv => Box::new(CsvCodec),
        TransferFormat::Html => Box::new(HtmlCodec),
    }
}

/// `bookmarks-YYYY-MM-DD.<ext>` for the given export date.
pub fn file_name(format: TransferFormat, date: NaiveDate) -> String {
    format!("bookmarks-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Escapes text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into the stored form.
pub(crate) fn parse_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(rfc3339(time.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;
    Some(rfc3339(Utc.from_utc_datetime(&midnight)))
}

/// Epoch milliseconds to the stored timestamp form.
pub(crate) fn from_epoch_millis(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis).single().map(rfc3339)
}

/// Epoch seconds to the stored timestamp form.
pub(crate) fn from_epoch_secs(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0).single().map(rfc3339)
}

/// The `YYYY-MM-DD` part of a stored timestamp, or the raw value when unparseable.
pub(crate) fn date_part(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(time) => time.with_timezone(&Utc).format("%Y-%m-%d").to_string(),
        Err(_) => created_at.chars().take(10).collect(),
    }
}
