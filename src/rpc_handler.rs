//! Message handler for the linkvault native-messaging protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested directly.
//! `handle_message` takes one request object `{"requestId", "action", ...payload}`
//! and returns the response envelope: the `requestId`, a `success` flag, and
//! either the action's result fields or an `error` string.
//!
//! The `App` lock is never held across an `.await`.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkCollectionTrait;
use crate::services::quick_capture::{auto_save_capture, link_capture, page_capture, selection_capture};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::tag_heuristics::generate_tags;
use crate::types::bookmark::{new_bookmark_id, Bookmark, BookmarkDraft, BookmarkPatch, BookmarkSource, Filter};
use crate::types::errors::BookmarkError;
use crate::types::transfer::{BrowserBookmarkNode, TransferFormat};

/// Correlation key echoed from request to response. Payload `id` fields name bookmarks.
pub const REQUEST_ID: &str = "requestId";

/// Handles one request and builds its response envelope. Never fails.
pub async fn handle_message(app: &Mutex<App>, request: &Value) -> Value {
    let request_id = request.get(REQUEST_ID).cloned().unwrap_or(Value::Null);
    let action = request.get("action").and_then(Value::as_str).unwrap_or("");

    let mut response = Map::new();
    response.insert(REQUEST_ID.to_string(), request_id);
    match handle_action(app, action, request).await {
        Ok(result) => {
            response.insert("success".to_string(), Value::Bool(true));
            if let Value::Object(fields) = result {
                response.extend(fields);
            }
        }
        Err(error) => {
            debug!(action, %error, "request failed");
            response.insert("success".to_string(), Value::Bool(false));
            response.insert("error".to_string(), Value::String(error));
        }
    }
    Value::Object(response)
}

/// Error envelope for a request line that is not valid JSON.
pub fn parse_error_response(error: &serde_json::Error) -> Value {
    json!({REQUEST_ID: null, "success": false, "error": format!("Invalid request: {}", error)})
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("missing {}", key))
}

fn opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Ids arrive as strings or, from older stored data, as numbers.
fn id_param(params: &Value, key: &str) -> Result<String, String> {
    match params.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(format!("missing {}", key)),
    }
}

fn parse_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, String> {
    let value = params.get(key).cloned().ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", key, e))
}

fn format_param(params: &Value) -> Result<TransferFormat, String> {
    str_param(params, "format")?
        .parse::<TransferFormat>()
        .map_err(|e| e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Builds a full record from a `bookmark` object sent by a client.
fn bookmark_from_payload(mut value: Value, app: &App) -> Result<Bookmark, String> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| "bookmark must be an object".to_string())?;
    if !obj.contains_key("id") {
        obj.insert("id".to_string(), Value::String(new_bookmark_id()));
    }
    if !obj.contains_key("category") {
        obj.insert("category".to_string(), Value::String(app.default_category().to_string()));
    }
    if !obj.contains_key("source") {
        obj.insert("source".to_string(), Value::String(BookmarkSource::Extension.as_str().to_string()));
    }
    serde_json::from_value(value).map_err(|e| BookmarkError::Validation(e.to_string()).to_string())
}

/// Dispatches one action. `Ok` carries an object merged into the response.
pub async fn handle_action(app: &Mutex<App>, action: &str, params: &Value) -> Result<Value, String> {
    match action {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "saveBookmark" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let saved = match params.get("bookmark") {
                Some(payload) => {
                    let bookmark = bookmark_from_payload(payload.clone(), &a)?;
                    a.save_bookmark(bookmark)
                }
                None => {
                    let draft: BookmarkDraft = serde_json::from_value(params.clone())
                        .map_err(|e| format!("invalid bookmark: {}", e))?;
                    a.save_draft(draft)
                }
            }
            .map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": saved}))
        }
        "getBookmarks" => {
            let filter = match opt_str(params, "filter") {
                Some(name) => Filter::parse(name).ok_or_else(|| format!("Unknown filter: {}", name))?,
                None => Filter::All,
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.collection.view(opt_str(params, "query"), filter);
            Ok(json!({"bookmarks": bookmarks}))
        }
        "deleteBookmark" => {
            let id = id_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.delete_bookmark(&id).map_err(|e| e.to_string())?;
            Ok(json!({}))
        }
        "updateBookmark" => {
            let id = id_param(params, "id")?;
            let patch: BookmarkPatch = parse_param(params, "changes")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a.update_bookmark(&id, patch).map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": bookmark}))
        }
        "toggleFavorite" => {
            let id = id_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let is_favorite = a.toggle_favorite(&id).map_err(|e| e.to_string())?;
            Ok(json!({"isFavorite": is_favorite}))
        }
        "reorderBookmarks" => {
            let dragged = id_param(params, "draggedId")?;
            let target = id_param(params, "targetId")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.collection.reorder(&dragged, &target).map_err(|e| e.to_string())?;
            Ok(json!({}))
        }
        "openManager" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"url": a.config.manager_url}))
        }
        "getStats" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"stats": a.collection.stats()}))
        }

        // ─── Quick capture ───
        "savePage" => {
            let url = str_param(params, "url")?;
            let title = opt_str(params, "title").unwrap_or_default();
            let source = opt_str(params, "source")
                .map(|s| BookmarkSource::from(s.to_string()))
                .unwrap_or(BookmarkSource::ContextMenu);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = page_capture(url, title, opt_str(params, "favIconUrl"), a.default_category(), source);
            let saved = a.save_bookmark(bookmark).map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": saved}))
        }
        "saveLink" => {
            let link_url = str_param(params, "linkUrl")?;
            let page_url = opt_str(params, "pageUrl").unwrap_or(link_url);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = link_capture(link_url, opt_str(params, "linkText"), page_url, a.default_category());
            let saved = a.save_bookmark(bookmark).map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": saved}))
        }
        "saveSelection" => {
            let selection = str_param(params, "selectionText")?;
            let page_url = opt_str(params, "pageUrl").unwrap_or_default();
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = selection_capture(selection, page_url, a.default_category())
                .ok_or_else(|| "No link found in the selected text".to_string())?;
            let saved = a.save_bookmark(bookmark).map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": saved}))
        }
        "autoSave" => {
            let url = str_param(params, "url")?;
            let title = opt_str(params, "title").unwrap_or_default();
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let Some(bookmark) = auto_save_capture(url, title, opt_str(params, "favIconUrl"), a.settings()) else {
                return Ok(json!({"saved": false}));
            };
            match a.save_bookmark(bookmark) {
                Ok(saved) => Ok(json!({"saved": true, "bookmark": saved})),
                Err(BookmarkError::DuplicateUrl(_)) => Ok(json!({"saved": false})),
                Err(e) => {
                    warn!(url, error = %e, "auto-save failed");
                    Err(e.to_string())
                }
            }
        }

        // ─── Metadata ───
        "fetchMetadata" => {
            let url = str_param(params, "url")?;
            let fetcher = {
                let a = app.lock().map_err(|e| e.to_string())?;
                a.fetcher.clone()
            };
            let metadata = fetcher.fetch_metadata(url).await;
            Ok(json!({"metadata": metadata}))
        }
        "generateTags" => {
            let url = str_param(params, "url")?;
            let tags = generate_tags(url, opt_str(params, "title"), opt_str(params, "description"));
            Ok(json!({"tags": tags}))
        }

        // ─── Import / export ───
        "importBookmarks" => {
            let format = format_param(params)?;
            let content = params
                .get("content")
                .and_then(Value::as_str)
                .ok_or("missing content")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let summary = a.import_content(format, content).map_err(|e| e.to_string())?;
            to_json(&summary)
        }
        "importBrowserBookmarks" => {
            let nodes: Vec<BrowserBookmarkNode> = parse_param(params, "nodes")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let summary = a.import_browser_tree(&nodes).map_err(|e| e.to_string())?;
            to_json(&summary)
        }
        "exportBookmarks" => {
            let format = format_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let file = a.export(format).map_err(|e| e.to_string())?;
            to_json(&file)
        }

        // ─── Settings ───
        "getSettings" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"settings": a.settings()}))
        }
        "updateSettings" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"settings": a.settings()}))
        }
        "resetSettings" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            Ok(json!({"settings": a.settings()}))
        }

        "" => Err("missing action".to_string()),
        other => Err(format!("Unknown action: {}", other)),
    }
}
