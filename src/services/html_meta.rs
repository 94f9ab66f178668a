//! Lightweight HTML scanning for page metadata and anchors.
//!
//! Not a full HTML parser: elements are located with attribute-aware
//! patterns, which is enough for `<title>`, `<meta>`, `<link>` and `<a>`
//! in real pages and in browsers' bookmark export files.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::types::metadata::RemoteMetadata;

/// One `<a href>` element found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub href: String,
    /// Visible link text, tags stripped and whitespace collapsed.
    pub text: String,
    pub title: Option<String>,
    /// Netscape bookmark files carry `ADD_DATE` in Unix seconds.
    pub add_date: Option<i64>,
}

/// Attributes of one start tag, names lowercased, values entity-decoded.
#[derive(Debug, Clone, Default)]
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("html pattern is valid"))
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?s)<!--.*?-->")
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"<[^>]*>")
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"(?is)<title\b[^>]*>(.*?)</title\s*>")
}

fn meta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r#"(?is)<meta\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r#"(?is)<link\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r#"(?is)<a\b((?:[^>"']|"[^"]*"|'[^']*')*)>(.*?)</a\s*>"#)
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
}

/// Strips HTML tags to get plain text.
pub fn strip_tags(html: &str) -> String {
    tag_re().replace_all(html, "").into_owned()
}

/// Decodes the named entities pages commonly use plus numeric references.
pub fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn without_comments(html: &str) -> String {
    comment_re().replace_all(html, "").into_owned()
}

fn parse_attributes(source: &str) -> Attributes {
    let attrs = attribute_re()
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect();
    Attributes(attrs)
}

fn element_text(inner: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(inner)))
}

/// Text of the first `<title>` element, if it has any.
pub fn extract_title(html: &str) -> Option<String> {
    let html = without_comments(html);
    title_re()
        .captures(&html)
        .map(|caps| element_text(&caps[1]))
        .filter(|t| !t.is_empty())
}

/// Every `<a>` element with a non-empty `href`, in document order.
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let html = without_comments(html);
    anchor_re()
        .captures_iter(&html)
        .filter_map(|caps| {
            let attrs = parse_attributes(&caps[1]);
            let href = attrs.get("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            Some(Anchor {
                href,
                text: element_text(&caps[2]),
                title: attrs
                    .get("title")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                add_date: attrs.get("add_date").and_then(|d| d.trim().parse().ok()),
            })
        })
        .collect()
}

/// Reads title, description, image and favicon from a page.
///
/// Open Graph wins over Twitter Card tags, which win over `<title>` and the
/// plain description meta tag. Values that are absent stay `None`.
pub fn parse_html_metadata(html: &str) -> RemoteMetadata {
    let html = without_comments(html);

    let metas: Vec<Attributes> = meta_re()
        .captures_iter(&html)
        .map(|caps| parse_attributes(&caps[1]))
        .collect();
    let meta = |key: &str| -> Option<String> {
        metas
            .iter()
            .find(|attrs| {
                attrs
                    .get("property")
                    .or_else(|| attrs.get("name"))
                    .is_some_and(|k| k.trim().eq_ignore_ascii_case(key))
            })
            .and_then(|attrs| attrs.get("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    };

    let links: Vec<Attributes> = link_re()
        .captures_iter(&html)
        .map(|caps| parse_attributes(&caps[1]))
        .collect();
    let link_href = |rel: &str| -> Option<String> {
        links
            .iter()
            .find(|attrs| {
                attrs
                    .get("rel")
                    .is_some_and(|r| collapse_whitespace(r).eq_ignore_ascii_case(rel))
            })
            .and_then(|attrs| attrs.get("href"))
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
    };

    RemoteMetadata {
        title: meta("og:title")
            .or_else(|| meta("twitter:title"))
            .or_else(|| extract_title(&html)),
        description: meta("og:description")
            .or_else(|| meta("twitter:description"))
            .or_else(|| meta("description")),
        image: meta("og:image").or_else(|| meta("twitter:image")),
        favicon: link_href("icon")
            .or_else(|| link_href("shortcut icon"))
            .or_else(|| link_href("apple-touch-icon")),
    }
}
