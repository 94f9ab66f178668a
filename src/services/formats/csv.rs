//! CSV export and quote-aware CSV import.

use super::{date_part, parse_date, FormatCodec};
use crate::types::bookmark::{
    new_bookmark_id, normalize_tags, now_timestamp, Bookmark, BookmarkSource, Category, UNTITLED,
};
use crate::types::errors::TransferError;
use crate::types::transfer::TransferFormat;

const BOM: char = '\u{feff}';

pub const HEADER: [&str; 7] = ["Title", "URL", "Description", "Tags", "Category", "Favorite", "Created"];

pub struct CsvCodec;

impl FormatCodec for CsvCodec {
    fn format(&self) -> TransferFormat {
        TransferFormat::Csv
    }

    fn export(&self, bookmarks: &[Bookmark]) -> Result<String, TransferError> {
        let mut lines = Vec::with_capacity(bookmarks.len() + 1);
        lines.push(HEADER.join(","));
        for bookmark in bookmarks {
            let row = [
                escape_field(&bookmark.title),
                escape_field(&bookmark.url),
                escape_field(&bookmark.description),
                escape_field(&bookmark.tags.join("; ")),
                escape_field(bookmark.category.as_str()),
                if bookmark.is_favorite { "yes" } else { "no" }.to_string(),
                escape_field(&date_part(&bookmark.created_at)),
            ];
            lines.push(row.join(","));
        }
        Ok(format!("{}{}", BOM, lines.join("\n")))
    }

    fn parse(&self, content: &str) -> Result<Vec<Bookmark>, TransferError> {
        let content = content.trim_start_matches(BOM);
        let records: Vec<String> = split_records(content)
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .collect();
        if records.len() < 2 {
            return Err(TransferError::EmptyCsv);
        }

        Ok(records[1..]
            .iter()
            .filter_map(|record| row_to_bookmark(&split_fields(record)))
            .collect())
    }
}

fn row_to_bookmark(fields: &[String]) -> Option<Bookmark> {
    if fields.len() < 2 {
        return None;
    }
    let url = fields[1].trim();
    if url.is_empty() {
        return None;
    }
    let field = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or_default();
    let raw = |i: usize| fields.get(i).map(String::as_str).unwrap_or_default();

    let tags = field(3)
        .split(';')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let category = match field(4) {
        "" => Category::Other,
        label => Category::parse(label),
    };

    Some(Bookmark {
        id: new_bookmark_id(),
        url: url.to_string(),
        title: match raw(0) {
            title if title.trim().is_empty() => UNTITLED.to_string(),
            title => title.to_string(),
        },
        description: raw(2).to_string(),
        image: String::new(),
        tags: normalize_tags(tags),
        category,
        created_at: parse_date(field(6)).unwrap_or_else(now_timestamp),
        is_favorite: is_yes(field(5)),
        source: BookmarkSource::ImportedCsv,
    })
}

fn is_yes(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    matches!(value.as_str(), "yes" | "true" | "1" | "نعم")
}

/// Quotes a field containing a comma, quote, CR or LF; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits content into records on line breaks outside quoted fields.
///
/// A quote left open at end of input ends its record at the next line
/// break, and splitting resumes after it, so a stray `"` costs one row.
pub fn split_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        let mut current = String::new();
        let mut in_quotes = false;
        let mut record_start = 0;
        let mut chars = rest.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '\r' if !in_quotes => {
                    if chars.peek().map(|(_, c)| *c) == Some('\n') {
                        chars.next();
                    }
                    records.push(std::mem::take(&mut current));
                    record_start = chars.peek().map_or(rest.len(), |(j, _)| *j);
                }
                '\n' if !in_quotes => {
                    records.push(std::mem::take(&mut current));
                    record_start = i + 1;
                }
                _ => current.push(ch),
            }
        }

        if !in_quotes {
            if !current.is_empty() {
                records.push(current);
            }
            break;
        }

        let unterminated = &rest[record_start..];
        match unterminated.find(['\r', '\n']) {
            Some(end) => {
                records.push(unterminated[..end].to_string());
                let after = &unterminated[end..];
                rest = after
                    .strip_prefix("\r\n")
                    .or_else(|| after.strip_prefix('\r'))
                    .or_else(|| after.strip_prefix('\n'))
                    .unwrap_or(after);
            }
            None => {
                records.push(unterminated.to_string());
                break;
            }
        }
    }
    records
}

/// Splits one record into fields, honouring quotes and `""` escapes.
pub fn split_fields(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
