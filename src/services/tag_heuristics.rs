//! Tag and category heuristics.
//!
//! Pure functions that turn a URL (and optionally a title and description)
//! into a short, deterministic list of topical tags.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::types::bookmark::MAX_TAGS;

/// Tag cap for the quick-capture paths, which never add keywords.
pub const QUICK_TAG_LIMIT: usize = 4;

/// Returned instead of tags when the URL cannot be parsed.
pub const FALLBACK_TAG: &str = "link";

/// Appended to every successfully parsed URL.
pub const GENERIC_TAG: &str = "site";

const MAX_KEYWORDS: usize = 3;

const STOP_WORDS: [&str; 12] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Domain patterns checked in order; the first branch with a matching
/// substring wins and later branches are not consulted.
static DOMAIN_CATEGORIES: [(&[&str], &[&str]); 5] = [
    (&["github", "gitlab", "bitbucket"], &["development", "programming"]),
    (&["youtube", "vimeo"], &["video", "entertainment"]),
    (&["news", "bbc", "cnn"], &["news"]),
    (&["edu", "coursera", "udemy"], &["education"]),
    (&["shop", "store", "amazon"], &["shopping"]),
];

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w{3,}\b").expect("keyword pattern is valid"))
}

/// Returns the hostname of an absolute URL, if it has one.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// Hostname with a leading `www.` removed.
pub fn bare_host(url: &str) -> Option<String> {
    hostname(url).map(|host| match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    })
}

/// True when the string parses as an absolute URL.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url.trim()).is_ok()
}

/// True for absolute `http`/`https` URLs.
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Tags implied by the host, from the first matching pattern branch.
pub fn categorize_by_domain(host: &str) -> &'static [&'static str] {
    let host = host.to_lowercase();
    DOMAIN_CATEGORIES
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| host.contains(p)))
        .map(|(_, tags)| *tags)
        .unwrap_or(&[])
}

/// Up to three lowercase keywords of at least three characters, stop words removed.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    keyword_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Generates up to five tags for a bookmark from its URL, title and description.
pub fn generate_tags(url: &str, title: Option<&str>, description: Option<&str>) -> Vec<String> {
    let Some(host) = bare_host(url) else {
        return vec![FALLBACK_TAG.to_string()];
    };

    let mut tags = base_tags(&host);

    let text = format!("{} {}", title.unwrap_or_default(), description.unwrap_or_default());
    for keyword in extract_keywords(&text) {
        push_unique(&mut tags, keyword);
    }

    tags.truncate(MAX_TAGS);
    tags
}

/// Tags for the capture paths: host, domain category, generic tag; capped at four.
pub fn quick_tags(url: &str) -> Vec<String> {
    let Some(host) = bare_host(url) else {
        return vec![FALLBACK_TAG.to_string()];
    };
    let mut tags = base_tags(&host);
    tags.truncate(QUICK_TAG_LIMIT);
    tags
}

fn base_tags(host: &str) -> Vec<String> {
    let mut tags = vec![host.to_string()];
    for tag in categorize_by_domain(host) {
        push_unique(&mut tags, tag.to_string());
    }
    push_unique(&mut tags, GENERIC_TAG.to_string());
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}
