// linkvault platform paths
// Resolves where the config file and the database live on each OS.
//
// Linux follows XDG (`$XDG_CONFIG_HOME`, `$XDG_DATA_HOME`), macOS uses
// `~/Library/Application Support/linkvault`, Windows uses `%APPDATA%\linkvault`.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "linkvault";

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    env_path("HOME").unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Returns the platform-specific configuration directory.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env_path("APPDATA")
            .unwrap_or_else(|| PathBuf::from("C:\\Users\\Default\\AppData\\Roaming"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env_path("XDG_CONFIG_HOME")
            .unwrap_or_else(|| home_dir().join(".config"))
            .join(APP_DIR)
    }
}

/// Returns the platform-specific data directory (holds the database).
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env_path("APPDATA")
            .unwrap_or_else(|| PathBuf::from("C:\\Users\\Default\\AppData\\Roaming"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env_path("XDG_DATA_HOME")
            .unwrap_or_else(|| home_dir().join(".local").join("share"))
            .join(APP_DIR)
    }
}
