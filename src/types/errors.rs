use thiserror::Error;

// === StorageError ===

/// Errors raised by the key-value storage gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying database rejected the operation.
    #[error("Storage database error: {0}")]
    Database(String),
    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
    /// The connection lock was poisoned by a panicking holder.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

// === BookmarkError ===

/// Errors related to bookmark collection operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// A bookmark with the same URL already exists.
    #[error("Duplicate bookmark URL: {0}")]
    DuplicateUrl(String),
    /// A required field is missing or malformed.
    #[error("Invalid bookmark: {0}")]
    Validation(String),
    /// The collection changed in memory but could not be written out.
    #[error("Bookmark persistence error: {0}")]
    Persistence(String),
}

impl From<StorageError> for BookmarkError {
    fn from(e: StorageError) -> Self {
        BookmarkError::Persistence(e.to_string())
    }
}

// === TransferError ===

/// Errors raised while importing or exporting bookmark files.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The JSON file could not be parsed at all.
    #[error("Invalid JSON file: {0}")]
    InvalidJson(String),
    /// The file parsed but does not have the expected structure.
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
    /// The CSV file has no data rows.
    #[error("CSV file is empty or has no data rows")]
    EmptyCsv,
    /// The HTML file contains no anchor with a valid URL.
    #[error("HTML file contains no valid links")]
    NoValidLinks,
    /// The requested format name is not one of json, csv or html.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Reading or writing the file failed.
    #[error("File I/O error: {0}")]
    Io(String),
    /// Encoding the export failed.
    #[error("Export serialization error: {0}")]
    Serialization(String),
    /// Merging the parsed records into the collection failed.
    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e.to_string())
    }
}

// === FetchError ===

/// Errors from a single remote metadata lookup. Never surfaced past the fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be completed.
    #[error("Metadata request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("Metadata endpoint returned HTTP {0}")]
    Status(u16),
    /// The response body was not in the expected shape.
    #[error("Metadata response could not be parsed: {0}")]
    Parse(String),
    /// The lookup succeeded but produced no title.
    #[error("Metadata lookup returned no title")]
    EmptyResult,
    /// The URL cannot be looked up remotely.
    #[error("Invalid URL for metadata lookup: {0}")]
    InvalidUrl(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The key does not name a known setting.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value has the wrong type for the setting.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    /// Reading or writing the settings record failed.
    #[error("Settings storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e.to_string())
    }
}

// === ConfigError ===

/// Errors loading the application configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Config I/O error: {0}")]
    Io(String),
    /// The config file is not valid JSON for `AppConfig`.
    #[error("Config parse error: {0}")]
    Parse(String),
}
