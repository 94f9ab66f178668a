//! Unit tests for the native-messaging request handler.

use std::sync::Mutex;

use serde_json::{json, Value};

use linkvault::app::App;
use linkvault::database::{StorageArea, StorageGateway};
use linkvault::rpc_handler::{handle_message, parse_error_response};

fn app() -> Mutex<App> {
    Mutex::new(App::in_memory().expect("in-memory app"))
}

async fn call(app: &Mutex<App>, request: Value) -> Value {
    handle_message(app, &request).await
}

async fn save(app: &Mutex<App>, url: &str, title: &str) -> Value {
    let response = call(
        app,
        json!({"requestId": 1, "action": "saveBookmark", "bookmark": {"url": url, "title": title}}),
    )
    .await;
    assert_eq!(response["success"], true, "save failed: {}", response);
    response["bookmark"].clone()
}

fn sync_keys(app: &Mutex<App>) -> Vec<String> {
    let storage = app.lock().unwrap().storage();
    storage.keys_with_prefix(StorageArea::Sync, "bookmark_").unwrap()
}

// ─── Envelope ───

#[tokio::test]
async fn test_ping_echoes_id() {
    let app = app();
    let response = call(&app, json!({"requestId": "req-7", "action": "ping"})).await;
    assert_eq!(response["requestId"], "req-7");
    assert_eq!(response["success"], true);
    assert_eq!(response["pong"], true);
}

#[tokio::test]
async fn test_unknown_and_missing_action() {
    let app = app();
    let response = call(&app, json!({"requestId": 2, "action": "launchRocket"})).await;
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "Unknown action: launchRocket");

    let response = call(&app, json!({"requestId": 3})).await;
    assert_eq!(response["error"], "missing action");
}

#[test]
fn test_parse_error_response() {
    let err = serde_json::from_str::<Value>("{nope").unwrap_err();
    let response = parse_error_response(&err);
    assert_eq!(response["requestId"], Value::Null);
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid request: "));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_save_bookmark_fills_defaults_and_mirrors() {
    let app = app();
    let saved = save(&app, "https://a.com", "A").await;
    assert_eq!(saved["source"], "extension");
    assert_eq!(saved["category"], "other");
    assert!(saved["id"].as_str().is_some_and(|id| !id.is_empty()));

    let key = format!("bookmark_{}", saved["id"].as_str().unwrap());
    assert_eq!(sync_keys(&app), vec![key]);
}

#[tokio::test]
async fn test_save_bookmark_duplicate_is_error() {
    let app = app();
    save(&app, "https://a.com", "A").await;
    let response = call(
        &app,
        json!({"requestId": 2, "action": "saveBookmark", "bookmark": {"url": "https://a.com", "title": "again"}}),
    )
    .await;
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "Duplicate bookmark URL: https://a.com");
}

#[tokio::test]
async fn test_save_bookmark_from_draft_fields() {
    let app = app();
    let response = call(
        &app,
        json!({"requestId": 1, "action": "saveBookmark", "url": "https://d.com", "title": "Draft",
               "tags": ["x"], "category": "work"}),
    )
    .await;
    assert_eq!(response["success"], true);
    assert_eq!(response["bookmark"]["category"], "work");
    assert_eq!(response["bookmark"]["source"], "manual");

    let response = call(&app, json!({"requestId": 2, "action": "saveBookmark", "url": "https://e.com"})).await;
    assert_eq!(response["error"], "Invalid bookmark: Title is required");
}

#[tokio::test]
async fn test_get_bookmarks_with_query_and_filter() {
    let app = app();
    save(&app, "https://rust-lang.org", "Rust").await;
    let go = save(&app, "https://go.dev", "Go").await;
    call(&app, json!({"requestId": 9, "action": "toggleFavorite", "id": go["id"]})).await;

    let all = call(&app, json!({"action": "getBookmarks"})).await;
    assert_eq!(all["bookmarks"].as_array().unwrap().len(), 2);
    assert_eq!(all["bookmarks"][0]["title"], "Go");

    let found = call(&app, json!({"action": "getBookmarks", "query": "rust"})).await;
    assert_eq!(found["bookmarks"].as_array().unwrap().len(), 1);

    let favorites = call(&app, json!({"action": "getBookmarks", "filter": "favorites"})).await;
    assert_eq!(favorites["bookmarks"][0]["url"], "https://go.dev");

    let bad = call(&app, json!({"action": "getBookmarks", "filter": "starred"})).await;
    assert_eq!(bad["error"], "Unknown filter: starred");
}

#[tokio::test]
async fn test_toggle_update_reorder_delete() {
    let app = app();
    let a = save(&app, "https://a.com", "A").await;
    let b = save(&app, "https://b.com", "B").await;

    let toggled = call(&app, json!({"action": "toggleFavorite", "id": a["id"]})).await;
    assert_eq!(toggled["isFavorite"], true);

    let updated = call(
        &app,
        json!({"action": "updateBookmark", "id": a["id"], "changes": {"title": "Alpha", "tags": ["t"]}}),
    )
    .await;
    assert_eq!(updated["bookmark"]["title"], "Alpha");
    assert_eq!(updated["bookmark"]["isFavorite"], true);

    let clash = call(
        &app,
        json!({"action": "updateBookmark", "id": a["id"], "changes": {"url": "https://b.com"}}),
    )
    .await;
    assert_eq!(clash["success"], false);

    // [B, A] → drag A onto B → [A, B]
    let moved = call(
        &app,
        json!({"action": "reorderBookmarks", "draggedId": a["id"], "targetId": b["id"]}),
    )
    .await;
    assert_eq!(moved["success"], true);
    let list = call(&app, json!({"action": "getBookmarks"})).await;
    assert_eq!(list["bookmarks"][0]["title"], "Alpha");

    let deleted = call(&app, json!({"action": "deleteBookmark", "id": b["id"]})).await;
    assert_eq!(deleted["success"], true);
    assert_eq!(sync_keys(&app), vec![format!("bookmark_{}", a["id"].as_str().unwrap())]);

    let again = call(&app, json!({"action": "deleteBookmark", "id": b["id"]})).await;
    assert_eq!(again["success"], false);
}

#[tokio::test]
async fn test_stats_and_open_manager() {
    let app = app();
    save(&app, "https://a.com", "A").await;
    let stats = call(&app, json!({"action": "getStats"})).await;
    assert_eq!(stats["stats"]["totalBookmarks"], 1);
    assert_eq!(stats["stats"]["totalFavorites"], 0);

    let manager = call(&app, json!({"action": "openManager"})).await;
    assert_eq!(manager["url"], "http://localhost:8000");
}

// ─── Quick capture ───

#[tokio::test]
async fn test_capture_actions() {
    let app = app();
    let page = call(
        &app,
        json!({"action": "savePage", "url": "https://github.com/tokio-rs", "title": "tokio-rs"}),
    )
    .await;
    assert_eq!(page["bookmark"]["source"], "context_menu");
    assert_eq!(page["bookmark"]["description"], "Saved from github.com");

    let link = call(
        &app,
        json!({"action": "saveLink", "linkUrl": "https://docs.rs", "linkText": "Docs",
               "pageUrl": "https://github.com/tokio-rs"}),
    )
    .await;
    assert_eq!(link["bookmark"]["title"], "Docs");

    let selection = call(
        &app,
        json!({"action": "saveSelection", "selectionText": "see https://crates.io now",
               "pageUrl": "https://blog.example.com"}),
    )
    .await;
    assert_eq!(selection["bookmark"]["url"], "https://crates.io");
    assert_eq!(selection["bookmark"]["tags"], json!(["selected text", "link"]));

    let no_link = call(
        &app,
        json!({"action": "saveSelection", "selectionText": "no links here"}),
    )
    .await;
    assert_eq!(no_link["error"], "No link found in the selected text");
}

#[tokio::test]
async fn test_auto_save_only_for_listed_hosts_and_once() {
    let app = app();
    let request = json!({"action": "autoSave", "url": "https://news.example.com/1", "title": "One"});

    let unlisted = call(&app, request.clone()).await;
    assert_eq!(unlisted["saved"], false);

    let update = call(
        &app,
        json!({"action": "updateSettings", "key": "autoSaveDomains", "value": ["news.example.com"]}),
    )
    .await;
    assert_eq!(update["settings"]["autoSaveDomains"], json!(["news.example.com"]));

    let first = call(&app, request.clone()).await;
    assert_eq!(first["saved"], true);
    assert_eq!(first["bookmark"]["source"], "auto_save");

    let second = call(&app, request).await;
    assert_eq!(second["success"], true);
    assert_eq!(second["saved"], false);
}

// ─── Metadata ───

#[tokio::test]
async fn test_fetch_metadata_offline_and_generate_tags() {
    let app = app();
    let response = call(
        &app,
        json!({"action": "fetchMetadata", "url": "https://example.com/hello-world"}),
    )
    .await;
    assert_eq!(response["metadata"]["title"], "Hello World");

    let tags = call(
        &app,
        json!({"action": "generateTags", "url": "https://youtube.com/watch", "title": "Cats"}),
    )
    .await;
    assert_eq!(tags["tags"], json!(["youtube.com", "video", "entertainment", "site", "cats"]));
}

// ─── Import / export ───

#[tokio::test]
async fn test_import_then_export() {
    let app = app();
    save(&app, "https://a.com", "A").await;

    let csv = "Title,URL,Description,Tags,Category,Favorite,Created\n\
               A again,https://a.com,,,,no,\n\
               B,https://b.com,,x; y,work,yes,2024-01-01\n";
    let summary = call(&app, json!({"action": "importBookmarks", "format": "csv", "content": csv})).await;
    assert_eq!(summary["success"], true);
    assert_eq!(summary["imported"], 1);
    assert_eq!(summary["duplicates"], 1);

    let export = call(&app, json!({"action": "exportBookmarks", "format": "json"})).await;
    assert_eq!(export["mimeType"], "application/json");
    let file_name = export["fileName"].as_str().unwrap();
    assert!(file_name.starts_with("bookmarks-") && file_name.ends_with(".json"));
    let content: Value = serde_json::from_str(export["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["totalBookmarks"], 2);
}

#[tokio::test]
async fn test_import_errors_leave_collection_untouched() {
    let app = app();
    let bad_json = call(&app, json!({"action": "importBookmarks", "format": "json", "content": "{"})).await;
    assert_eq!(bad_json["success"], false);
    assert!(bad_json["error"].as_str().unwrap().starts_with("Invalid JSON file"));

    let bad_format = call(&app, json!({"action": "importBookmarks", "format": "xml", "content": ""})).await;
    assert_eq!(bad_format["error"], "Unsupported file format: xml");

    let stats = call(&app, json!({"action": "getStats"})).await;
    assert_eq!(stats["stats"]["totalBookmarks"], 0);
}

#[tokio::test]
async fn test_import_browser_bookmarks() {
    let app = app();
    let nodes = json!([{ "title": "Bar", "children": [
        { "url": "https://one.com", "title": "One" },
        { "url": "https://one.com", "title": "One again" },
        { "url": "https://two.com", "title": "Two" }
    ]}]);
    let summary = call(&app, json!({"action": "importBrowserBookmarks", "nodes": nodes})).await;
    assert_eq!(summary["imported"], 2);
    assert_eq!(summary["duplicates"], 1);
    assert_eq!(summary["total"], 3);
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_actions() {
    let app = app();
    let settings = call(&app, json!({"action": "getSettings"})).await;
    assert_eq!(settings["settings"]["autoSync"], true);

    let bad = call(&app, json!({"action": "updateSettings", "key": "colour", "value": 1})).await;
    assert_eq!(bad["error"], "Invalid settings key: colour");

    call(&app, json!({"action": "updateSettings", "key": "autoSync", "value": false})).await;
    save(&app, "https://a.com", "A").await;
    assert!(sync_keys(&app).is_empty(), "no mirroring while autoSync is off");

    let reset = call(&app, json!({"action": "resetSettings"})).await;
    assert_eq!(reset["settings"]["autoSync"], true);
}
