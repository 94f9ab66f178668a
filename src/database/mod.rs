//! linkvault database layer.
//!
//! Provides SQLite connection management, schema migrations, and the
//! key-value storage gateway the rest of the crate persists through.
//!
//! # Usage
//!
//! ```no_run
//! use linkvault::database::{Database, StorageArea, StorageGateway};
//!
//! let db = Database::open("linkvault.db").expect("failed to open database");
//! let bookmarks = db.get(StorageArea::Local, "bookmarks").expect("read failed");
//! ```

pub mod connection;
pub mod gateway;
pub mod migrations;

pub use connection::Database;
pub use gateway::{StorageArea, StorageGateway, BOOKMARKS_KEY, SETTINGS_KEY, SYNC_KEY_PREFIX};
