use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Maximum number of tags a bookmark carries.
pub const MAX_TAGS: usize = 5;

/// Title used whenever a record arrives without one.
pub const UNTITLED: &str = "Untitled";

/// Represents a saved bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "now_timestamp")]
    pub created_at: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub source: BookmarkSource,
}

impl Bookmark {
    /// Creates a bookmark with a fresh id and the current timestamp.
    pub fn new(url: &str, title: &str, source: BookmarkSource) -> Self {
        Self {
            id: new_bookmark_id(),
            url: url.trim().to_string(),
            title: title.to_string(),
            description: String::new(),
            image: String::new(),
            tags: Vec::new(),
            category: Category::Other,
            created_at: now_timestamp(),
            is_favorite: false,
            source,
        }
    }

    /// Applies the record invariants: non-empty title, clean capped tag list.
    pub fn normalized(mut self) -> Self {
        let title = self.title.trim();
        self.title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        };
        self.url = self.url.trim().to_string();
        self.tags = normalize_tags(self.tags);
        self
    }
}

/// Fields a user supplies when adding a bookmark by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmarkDraft {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub category: Option<Category>,
}

/// Partial update applied to an existing bookmark. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmarkPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    pub is_favorite: Option<bool>,
}

/// Fixed set of categories a bookmark can belong to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Work,
    Personal,
    Education,
    Entertainment,
    News,
    Technology,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Work,
        Category::Personal,
        Category::Education,
        Category::Entertainment,
        Category::News,
        Category::Technology,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Education => "education",
            Category::Entertainment => "entertainment",
            Category::News => "news",
            Category::Technology => "technology",
            Category::Other => "other",
        }
    }

    /// Human-readable heading used by the HTML export.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::News => "News",
            Category::Technology => "Technology",
            Category::Other => "Other",
        }
    }

    /// Looks up a known label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Parses a category label, mapping anything unrecognised to `Other`.
    pub fn parse(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::parse(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Where a bookmark came from. Informational only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum BookmarkSource {
    #[default]
    Manual,
    Extension,
    ContextMenu,
    ContentScript,
    ImportedJson,
    ImportedCsv,
    ImportedHtml,
    Browser,
    AutoSave,
    Unknown,
}

impl BookmarkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkSource::Manual => "manual",
            BookmarkSource::Extension => "extension",
            BookmarkSource::ContextMenu => "context_menu",
            BookmarkSource::ContentScript => "content_script",
            BookmarkSource::ImportedJson => "imported_json",
            BookmarkSource::ImportedCsv => "imported_csv",
            BookmarkSource::ImportedHtml => "imported_html",
            BookmarkSource::Browser => "browser",
            BookmarkSource::AutoSave => "auto_save",
            BookmarkSource::Unknown => "unknown",
        }
    }
}

impl From<String> for BookmarkSource {
    fn from(label: String) -> Self {
        match label.as_str() {
            "manual" => BookmarkSource::Manual,
            "extension" => BookmarkSource::Extension,
            "context_menu" => BookmarkSource::ContextMenu,
            "content_script" => BookmarkSource::ContentScript,
            "imported_json" => BookmarkSource::ImportedJson,
            "imported_csv" => BookmarkSource::ImportedCsv,
            "imported_html" => BookmarkSource::ImportedHtml,
            "browser" => BookmarkSource::Browser,
            "auto_save" => BookmarkSource::AutoSave,
            _ => BookmarkSource::Unknown,
        }
    }
}

impl From<BookmarkSource> for String {
    fn from(source: BookmarkSource) -> Self {
        source.as_str().to_string()
    }
}

/// Totals shown next to the bookmark list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_bookmarks: usize,
    pub total_tags: usize,
    pub total_categories: usize,
    pub total_favorites: usize,
}

/// List views offered by the manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    /// The most recently added entries.
    Recent,
    Favorites,
}

impl Filter {
    pub const RECENT_LIMIT: usize = 10;

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "all" | "" => Some(Filter::All),
            "recent" => Some(Filter::Recent),
            "favorites" | "favourites" => Some(Filter::Favorites),
            _ => None,
        }
    }
}

/// Generates a time-based id with a random suffix so bulk imports never collide.
pub fn new_bookmark_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Trims tags, drops empties and repeats, and caps the list at [`MAX_TAGS`].
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len().min(MAX_TAGS));
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
        if out.len() == MAX_TAGS {
            break;
        }
    }
    out
}

/// Splits a comma-separated tag field as typed into a form.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(',').map(str::to_string).collect())
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "bookmark id must be a string or number, got {}",
            other
        ))),
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
