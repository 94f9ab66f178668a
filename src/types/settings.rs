use serde::{Deserialize, Serialize};

use super::bookmark::Category;

/// User settings stored next to the bookmark list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    #[serde(default = "default_true")]
    pub show_notifications: bool,
    #[serde(default)]
    pub default_category: Category,
    /// Hosts whose pages are saved automatically once loaded.
    #[serde(default)]
    pub auto_save_domains: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_sync: true,
            show_notifications: true,
            default_category: Category::Other,
            auto_save_domains: Vec::new(),
        }
    }
}
