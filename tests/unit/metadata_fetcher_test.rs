//! Unit tests for the metadata fallback chain, against mock HTTP endpoints.

use serde_json::json;
use wiremock::matchers::{any, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkvault::config::MetadataConfig;
use linkvault::services::metadata_fetcher::{
    capitalize_words, create_client, extract_basic_info, LinkApiSource, MetadataFetcher,
    MetadataSource,
};
use linkvault::types::errors::FetchError;

const PAGE_URL: &str = "https://example.com/getting-started";

fn config_for(server: &MockServer) -> MetadataConfig {
    MetadataConfig {
        relay_endpoint: format!("{}/relay", server.uri()),
        opengraph_endpoint: format!("{}/og", server.uri()),
        link_api_endpoint: format!("{}/extract", server.uri()),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

fn relay_page(html: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "contents": html }))
}

#[tokio::test]
async fn test_relay_result_is_used_and_tags_regenerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/relay"))
        .and(query_param("url", PAGE_URL))
        .respond_with(relay_page(
            r#"<head><meta property="og:title" content="Relay Title">
               <meta name="description" content="Great stuff"></head>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path_regex("^/(og|extract)"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&config_for(&server)).unwrap();
    let meta = fetcher.fetch_metadata(PAGE_URL).await;

    assert_eq!(meta.title, "Relay Title");
    assert_eq!(meta.description, "Great stuff");
    assert_eq!(meta.tags, vec!["example.com", "site", "relay", "title", "great"]);
}

#[tokio::test]
async fn test_failed_relay_falls_through_to_opengraph() {
    let server = MockServer::start().await;
    Mock::given(path("/relay"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/og/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hybridGraph": { "title": "Hybrid Title", "image": "https://img.example.com/h.png" },
            "openGraph": { "title": "OG Title", "description": "From open graph" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/extract"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&config_for(&server)).unwrap();
    let meta = fetcher.fetch_metadata(PAGE_URL).await;

    assert_eq!(meta.title, "Hybrid Title");
    assert_eq!(meta.description, "From open graph");
    assert_eq!(meta.image, "https://img.example.com/h.png");
}

#[tokio::test]
async fn test_titleless_results_advance_to_link_api() {
    let server = MockServer::start().await;
    Mock::given(path("/relay"))
        .respond_with(relay_page("<p>no title anywhere</p>"))
        .mount(&server)
        .await;
    Mock::given(path_regex("^/og/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/extract"))
        .and(query_param("url", PAGE_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Link Api Title",
            "images": [{ "url": "https://img.example.com/first.png" }],
            "image": "https://img.example.com/ignored.png"
        })))
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&config_for(&server)).unwrap();
    let meta = fetcher.fetch_metadata(PAGE_URL).await;

    assert_eq!(meta.title, "Link Api Title");
    assert_eq!(meta.image, "https://img.example.com/first.png");
    // Field the remote result lacked keeps the heuristic value.
    assert_eq!(meta.description, "Page from example.com");
}

#[tokio::test]
async fn test_all_sources_failing_returns_basic_info() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&config_for(&server)).unwrap();
    let meta = fetcher.fetch_metadata(PAGE_URL).await;

    assert_eq!(meta, extract_basic_info(PAGE_URL));
    assert_eq!(meta.title, "Getting Started");
}

#[tokio::test]
async fn test_non_web_url_skips_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = MetadataFetcher::new(&config_for(&server)).unwrap();
    let meta = fetcher.fetch_metadata("ftp://files.example.com/report.pdf").await;
    assert_eq!(meta.title, "Report.pdf");
    assert_eq!(meta.description, "Page from files.example.com");
}

#[tokio::test]
async fn test_link_api_status_and_parse_errors() {
    let server = MockServer::start().await;
    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = create_client(&MetadataConfig::default()).unwrap();
    let down = LinkApiSource::new(client.clone(), &format!("{}/down", server.uri()));
    assert!(matches!(down.lookup(PAGE_URL).await, Err(FetchError::Status(503))));

    let garbled = LinkApiSource::new(client, &format!("{}/garbled", server.uri()));
    assert!(matches!(garbled.lookup(PAGE_URL).await, Err(FetchError::Parse(_))));
}

#[tokio::test]
async fn test_offline_fetcher_returns_basic_info() {
    let meta = MetadataFetcher::offline().fetch_metadata("https://www.example.com/").await;
    assert_eq!(meta.title, "Www.example.com");
    assert_eq!(meta.tags, vec!["www.example.com", "site", "link"]);
    assert_eq!(
        meta.favicon.as_deref(),
        Some("https://www.google.com/s2/favicons?domain=www.example.com&sz=64")
    );
}

#[test]
fn test_basic_info_for_unparseable_url() {
    let meta = extract_basic_info("definitely not a url");
    assert_eq!(meta.title, "New link");
    assert_eq!(meta.description, "Link description");
    assert_eq!(meta.image, "https://via.placeholder.com/400x200?text=No+Preview");
    assert_eq!(meta.tags, vec!["link"]);
    assert_eq!(meta.favicon, None);
}

#[test]
fn test_basic_info_title_from_last_path_segment() {
    assert_eq!(extract_basic_info("https://a.com/docs/my_first-post.html").title, "My First Post");
    assert_eq!(extract_basic_info("https://a.com/docs/caf%C3%A9s/").title, "Cafés");
    assert_eq!(capitalize_words("rust BOOK"), "Rust Book");
}
