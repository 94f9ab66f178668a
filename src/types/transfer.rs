use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::TransferError;

/// File formats the import/export engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferFormat {
    Json,
    Csv,
    Html,
}

impl TransferFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TransferFormat::Json => "json",
            TransferFormat::Csv => "csv",
            TransferFormat::Html => "html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TransferFormat::Json => "application/json",
            TransferFormat::Csv => "text/csv",
            TransferFormat::Html => "text/html",
        }
    }

    /// Guesses the format from a file extension (`.htm` counts as HTML).
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for TransferFormat {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(TransferFormat::Json),
            "csv" => Ok(TransferFormat::Csv),
            "html" | "htm" => Ok(TransferFormat::Html),
            other => Err(TransferError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Outcome of merging an import batch into the collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    /// Number of candidate records the file produced.
    pub total: usize,
}

/// One node of a browser's native bookmark tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowserBookmarkNode {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub date_added: Option<f64>,
    #[serde(default)]
    pub children: Option<Vec<BrowserBookmarkNode>>,
}

/// A rendered export, ready to be written or downloaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}
