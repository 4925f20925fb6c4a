use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default lifetime of a cached page body.
pub const DEFAULT_CACHE_TTL_S: u64 = 600;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("search failed: {0}")]
    Search(String),
    /// No scoring candidate and no usable `body` element.
    #[error("content not found")]
    ContentNotFound,
    #[error("not supported: {0}")]
    NotSupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchCachePolicy {
    /// If true, allow reading from cache.
    pub read: bool,
    /// If true, allow writing to cache.
    pub write: bool,
    /// Lifetime for entries written by this request (default: 10 minutes).
    pub ttl_s: Option<u64>,
}

impl FetchCachePolicy {
    pub fn disabled() -> Self {
        Self {
            read: false,
            write: false,
            ttl_s: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_s.unwrap_or(DEFAULT_CACHE_TTL_S))
    }
}

impl Default for FetchCachePolicy {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            ttl_s: Some(DEFAULT_CACHE_TTL_S),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Timeout for the network leg.
    pub timeout_ms: Option<u64>,
    /// Hard cap on bytes read from the response body.
    pub max_bytes: Option<u64>,
    /// Extra request headers (credential headers are dropped by the fetcher).
    pub headers: BTreeMap<String, String>,
    pub cache: FetchCachePolicy,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: None,
            max_bytes: None,
            headers: BTreeMap::new(),
            cache: FetchCachePolicy::default(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parse and validate the target URL.
    pub fn parsed_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.url)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub bytes: Vec<u8>,
    pub truncated: bool,
    pub source: FetchSource,
    pub timings_ms: BTreeMap<String, u128>,
}

impl FetchResponse {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

#[async_trait::async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse>;
}

/// A page body as stored in a [`PageCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub bytes: Vec<u8>,
}

/// Key-value store for fetched pages with a per-entry TTL.
///
/// Implementations are synchronous; async callers should move calls onto a
/// blocking thread. Expired entries must read as a miss.
pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CachedPage>>;
    fn put(&self, key: &str, page: &CachedPage, ttl: Duration) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: None,
            timeout_ms: None,
        }
    }
}

/// One organic web result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub provider: String,
    pub timings_ms: BTreeMap<String, u128>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse>;
}

/// Response envelope for a readability scrape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeResponse {
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Open Graph / Twitter Card / `<title>` metadata for a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// e.g. "image/gif"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// e.g. "Tenor", "Giphy"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
