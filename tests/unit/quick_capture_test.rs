//! Unit tests for the quick-capture builders and the auto-save rule.

use rstest::rstest;

use linkvault::services::quick_capture::{
    auto_save_capture, link_capture, page_capture, selection_capture, should_auto_save,
};
use linkvault::types::bookmark::{BookmarkSource, Category};
use linkvault::types::settings::Settings;

fn settings_with(domains: &[&str]) -> Settings {
    Settings {
        default_category: Category::Education,
        auto_save_domains: domains.iter().map(|d| d.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_page_capture() {
    let b = page_capture(
        "https://www.github.com/rust-lang",
        "  rust-lang  ",
        Some("https://github.com/favicon.ico"),
        Category::Technology,
        BookmarkSource::ContextMenu,
    );
    assert_eq!(b.title, "rust-lang");
    assert_eq!(b.description, "Saved from www.github.com");
    assert_eq!(b.image, "https://github.com/favicon.ico");
    assert_eq!(b.tags, vec!["github.com", "development", "programming", "site"]);
    assert_eq!(b.category, Category::Technology);
    assert_eq!(b.source, BookmarkSource::ContextMenu);
    assert!(!b.is_favorite);
}

#[test]
fn test_page_capture_without_title_or_icon() {
    let b = page_capture("https://a.com", "", None, Category::Other, BookmarkSource::Extension);
    assert_eq!(b.title, "Untitled");
    assert_eq!(b.image, "");
}

#[test]
fn test_link_capture_uses_text_or_url() {
    let b = link_capture(
        "https://docs.rs/tokio",
        Some(" Tokio docs "),
        "https://blog.example.com/post",
        Category::Other,
    );
    assert_eq!(b.title, "Tokio docs");
    assert_eq!(b.description, "Link saved from blog.example.com");
    assert_eq!(b.source, BookmarkSource::ContextMenu);
    assert_eq!(b.tags, vec!["docs.rs", "site"]);

    let bare = link_capture("https://docs.rs/serde", None, "https://x.com", Category::Other);
    assert_eq!(bare.title, "https://docs.rs/serde");
}

#[test]
fn test_selection_capture_finds_first_link() {
    let text = "read https://one.example/a?b=1 and then https://two.example";
    let b = selection_capture(text, "https://news.example/story", Category::News).unwrap();
    assert_eq!(b.url, "https://one.example/a?b=1");
    assert_eq!(b.title, text);
    assert_eq!(b.description, "Selected text from news.example");
    assert_eq!(b.tags, vec!["selected text", "link"]);
    assert_eq!(b.category, Category::News);
}

#[test]
fn test_selection_capture_truncates_long_text() {
    let text = format!("https://a.com {}", "x".repeat(200));
    let b = selection_capture(&text, "https://a.com", Category::Other).unwrap();
    assert_eq!(b.title.chars().count(), 103);
    assert!(b.title.starts_with("https://a.com xxx"));
    assert!(b.title.ends_with("..."));
}

#[test]
fn test_selection_without_link_is_none() {
    assert!(selection_capture("just words, ftp://nope", "https://a.com", Category::Other).is_none());
}

#[rstest]
#[case("https://news.ycombinator.com/item?id=1", true)]
#[case("https://NEWS.YCOMBINATOR.COM/", true)]
#[case("https://ycombinator.com/", false)]
#[case("https://sub.news.ycombinator.com/", false)]
#[case("not a url", false)]
fn test_should_auto_save_matches_exact_host(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(should_auto_save(url, &settings_with(&["news.ycombinator.com"])), expected);
}

#[test]
fn test_auto_save_capture_uses_default_category() {
    let settings = settings_with(&["example.com"]);
    let b = auto_save_capture("https://example.com/a", "A", None, &settings).unwrap();
    assert_eq!(b.source, BookmarkSource::AutoSave);
    assert_eq!(b.category, Category::Education);
    assert!(auto_save_capture("https://other.com", "B", None, &settings).is_none());
}
