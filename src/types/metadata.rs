use serde::{Deserialize, Serialize};

/// Best-effort description of a page, used to prefill bookmark fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub favicon: Option<String>,
}

/// Whatever fields one remote lookup managed to produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
}

impl RemoteMetadata {
    /// A lookup only counts when it found a title.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Layers the non-empty fields of `self` over `base`.
    pub fn merge_over(self, mut base: PageMetadata) -> PageMetadata {
        if let Some(title) = non_empty(self.title) {
            base.title = title;
        }
        if let Some(description) = non_empty(self.description) {
            base.description = description;
        }
        if let Some(image) = non_empty(self.image) {
            base.image = image;
        }
        if let Some(favicon) = non_empty(self.favicon) {
            base.favicon = Some(favicon);
        }
        base
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
