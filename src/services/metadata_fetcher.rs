//! Metadata Fetcher for linkvault.
//!
//! Enriches a URL with a title, description and preview image. A heuristic
//! record derived from the URL alone is always computed first; remote
//! sources are then tried in a fixed order until one produces a title.
//! Failures only advance the chain, so `fetch_metadata` never fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::MetadataConfig;
use crate::services::html_meta::parse_html_metadata;
use crate::services::tag_heuristics::{self, generate_tags, is_web_url};
use crate::types::errors::FetchError;
use crate::types::metadata::{PageMetadata, RemoteMetadata};

const FALLBACK_TITLE: &str = "New link";
const FALLBACK_DESCRIPTION: &str = "Link description";
const FALLBACK_IMAGE: &str = "https://via.placeholder.com/400x200?text=No+Preview";

/// One remote strategy in the fallback chain.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;
    async fn lookup(&self, url: &str) -> Result<RemoteMetadata, FetchError>;
}

/// Builds the shared HTTP client with the configured timeout and user agent.
pub fn create_client(config: &MetadataConfig) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(FetchError::from)
}

async fn get_json<T: for<'de> Deserialize<'de>>(client: &Client, url: &str) -> Result<T, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

// ─── CORS relay ───

/// Fetches the raw page through a relay and parses its HTML.
pub struct CorsRelaySource {
    client: Client,
    endpoint: String,
}

impl CorsRelaySource {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self { client, endpoint: endpoint.trim_end_matches('/').to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    contents: Option<String>,
}

#[async_trait]
impl MetadataSource for CorsRelaySource {
    fn name(&self) -> &'static str {
        "cors-relay"
    }

    async fn lookup(&self, url: &str) -> Result<RemoteMetadata, FetchError> {
        let request_url = format!("{}?url={}", self.endpoint, urlencoding::encode(url));
        let body: RelayResponse = get_json(&self.client, &request_url).await?;
        let html = body
            .contents
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FetchError::Parse("relay returned no page contents".to_string()))?;
        Ok(parse_html_metadata(&html))
    }
}

// ─── OpenGraph API ───

/// Queries an OpenGraph extraction service.
pub struct OpenGraphApiSource {
    client: Client,
    endpoint: String,
}

impl OpenGraphApiSource {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self { client, endpoint: endpoint.trim_end_matches('/').to_string() }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GraphFields {
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    favicon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenGraphResponse {
    #[serde(default)]
    hybrid_graph: Option<GraphFields>,
    #[serde(default)]
    open_graph: Option<GraphFields>,
}

#[async_trait]
impl MetadataSource for OpenGraphApiSource {
    fn name(&self) -> &'static str {
        "opengraph-api"
    }

    async fn lookup(&self, url: &str) -> Result<RemoteMetadata, FetchError> {
        let request_url = format!("{}/{}", self.endpoint, urlencoding::encode(url));
        let body: OpenGraphResponse = get_json(&self.client, &request_url).await?;
        let hybrid = body.hybrid_graph.unwrap_or_default();
        let open = body.open_graph.unwrap_or_default();
        Ok(RemoteMetadata {
            title: hybrid.title.or(open.title),
            description: hybrid.description.or(open.description),
            image: hybrid.image.or(open.image),
            favicon: hybrid.favicon,
        })
    }
}

// ─── Link metadata API ───

/// Queries a generic link-metadata extraction service.
pub struct LinkApiSource {
    client: Client,
    endpoint: String,
}

impl LinkApiSource {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self { client, endpoint: endpoint.trim_end_matches('/').to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct LinkImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkApiResponse {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    images: Vec<LinkImage>,
    image: Option<String>,
    favicon: Option<String>,
}

#[async_trait]
impl MetadataSource for LinkApiSource {
    fn name(&self) -> &'static str {
        "link-api"
    }

    async fn lookup(&self, url: &str) -> Result<RemoteMetadata, FetchError> {
        let request_url = format!("{}?url={}", self.endpoint, urlencoding::encode(url));
        let body: LinkApiResponse = get_json(&self.client, &request_url).await?;
        let first_image = body.images.into_iter().find_map(|i| i.url);
        Ok(RemoteMetadata {
            title: body.title,
            description: body.description,
            image: first_image.or(body.image),
            favicon: body.favicon,
        })
    }
}

// ─── Fetcher ───

/// Runs the remote sources in order over the heuristic fallback.
#[derive(Clone)]
pub struct MetadataFetcher {
    sources: Arc<Vec<Box<dyn MetadataSource>>>,
}

impl MetadataFetcher {
    /// Builds the standard chain: relay, OpenGraph API, link API.
    pub fn new(config: &MetadataConfig) -> Result<Self, FetchError> {
        let client = create_client(config)?;
        Ok(Self::with_sources(vec![
            Box::new(CorsRelaySource::new(client.clone(), &config.relay_endpoint)),
            Box::new(OpenGraphApiSource::new(client.clone(), &config.opengraph_endpoint)),
            Box::new(LinkApiSource::new(client, &config.link_api_endpoint)),
        ]))
    }

    pub fn with_sources(sources: Vec<Box<dyn MetadataSource>>) -> Self {
        Self { sources: Arc::new(sources) }
    }

    /// A fetcher that never touches the network.
    pub fn offline() -> Self {
        Self::with_sources(Vec::new())
    }

    /// Returns the best metadata available for `url`; never fails.
    pub async fn fetch_metadata(&self, url: &str) -> PageMetadata {
        let basic = extract_basic_info(url);
        if !is_web_url(url) {
            debug!(url, "skipping remote metadata lookup for non-web URL");
            return basic;
        }

        match self.fetch_remote(url).await {
            Some(remote) => {
                let mut merged = remote.merge_over(basic);
                merged.tags = generate_tags(url, Some(&merged.title), Some(&merged.description));
                merged
            }
            None => basic,
        }
    }

    /// First source result carrying a title, or `None` when all fail.
    async fn fetch_remote(&self, url: &str) -> Option<RemoteMetadata> {
        for source in self.sources.iter() {
            match source.lookup(url).await {
                Ok(metadata) if metadata.has_title() => {
                    debug!(source = source.name(), url, "metadata lookup succeeded");
                    return Some(metadata);
                }
                Ok(_) => warn!(source = source.name(), url, "{}", FetchError::EmptyResult),
                Err(e) => warn!(source = source.name(), url, error = %e, "metadata lookup failed, trying next"),
            }
        }
        None
    }
}

/// Derives title, description, image and tags from the URL string alone.
pub fn extract_basic_info(url: &str) -> PageMetadata {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return placeholder_info();
    };
    let Some(host) = parsed.host_str().filter(|h| !h.is_empty()).map(str::to_string) else {
        return placeholder_info();
    };

    let title = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| {
            let decoded = urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            title_from_segment(&decoded)
        })
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| host.clone());

    PageMetadata {
        title: capitalize_words(&title),
        description: format!("Page from {}", host),
        image: format!(
            "https://via.placeholder.com/400x200?text={}",
            urlencoding::encode(&host)
        ),
        tags: vec![host.clone(), tag_heuristics::GENERIC_TAG.to_string(), tag_heuristics::FALLBACK_TAG.to_string()],
        favicon: Some(format!("https://www.google.com/s2/favicons?domain={}&sz=64", host)),
    }
}

fn placeholder_info() -> PageMetadata {
    PageMetadata {
        title: FALLBACK_TITLE.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        image: FALLBACK_IMAGE.to_string(),
        tags: vec![tag_heuristics::FALLBACK_TAG.to_string()],
        favicon: None,
    }
}

fn title_from_segment(segment: &str) -> String {
    let spaced = segment.replace(['-', '_'], " ");
    let lower = spaced.to_lowercase();
    for ext in [".html", ".php", ".asp", ".jsp"] {
        if lower.ends_with(ext) {
            return spaced[..spaced.len() - ext.len()].to_string();
        }
    }
    spaced
}

/// Upper-cases the first character of each word and lower-cases the rest.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
