// linkvault Settings Engine
// Manages user settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as one JSON record under `local/settings` in the storage gateway.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::database::{StorageArea, StorageGateway, SETTINGS_KEY};
use crate::types::bookmark::Category;
use crate::types::errors::SettingsError;
use crate::types::settings::Settings;

const DEFAULT_CATEGORY_KEY: &str = "defaultCategory";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<Settings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &Settings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
}

/// Settings engine backed by the key-value storage gateway.
pub struct SettingsEngine {
    storage: Arc<dyn StorageGateway>,
    settings: Settings,
}

impl SettingsEngine {
    /// Creates an engine holding defaults; call `load` to read stored values.
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self {
            storage,
            settings: Settings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from storage.
    ///
    /// A missing record yields defaults. Fields missing from a stored record
    /// take their default values.
    fn load(&mut self) -> Result<Settings, SettingsError> {
        self.settings = match self.storage.get(StorageArea::Local, SETTINGS_KEY)? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                SettingsError::Storage(format!("Failed to parse stored settings: {}", e))
            })?,
            None => Settings::default(),
        };
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Storage(format!("Failed to serialize settings: {}", e))
        })?;
        self.storage.set(StorageArea::Local, SETTINGS_KEY, &value)?;
        Ok(())
    }

    fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Updates one setting by its camelCase key (dot notation for nested keys).
    ///
    /// The new value is validated by deserializing the whole record, then
    /// persisted.
    ///
    /// # Examples
    /// - `"autoSync"` → `false`
    /// - `"defaultCategory"` → `"work"`
    /// - `"autoSaveDomains"` → `["news.ycombinator.com"]`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        if key == DEFAULT_CATEGORY_KEY {
            let known = value.as_str().and_then(Category::from_label);
            if known.is_none() {
                return Err(SettingsError::InvalidValue(format!(
                    "{}: unknown category {}",
                    key, value
                )));
            }
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::Storage(format!("Failed to serialize settings: {}", e))
        })?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = match parts.split_last() {
            Some(split) => split,
            None => return Err(SettingsError::InvalidKey(key.to_string())),
        };

        let mut current = &mut json_value;
        for part in parents {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;
        }
        match current {
            Value::Object(map) if map.contains_key(*last) => {
                map.insert(last.to_string(), value);
            }
            _ => return Err(SettingsError::InvalidKey(key.to_string())),
        }

        let new_settings: Settings = serde_json::from_value(json_value)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;

        self.settings = new_settings;
        self.save()?;
        debug!(key, "setting updated");
        Ok(())
    }

    /// Resets all settings to defaults and saves them.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = Settings::default();
        self.save()
    }
}
