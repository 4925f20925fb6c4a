use crate::cache::cache_key;
use readweb_core::{
    CachedPage, Error, FetchBackend, FetchRequest, FetchResponse, FetchSource, PageCache, Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Desktop browser UA: many sites serve stripped or mobile markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct LocalFetcher {
    client: reqwest::Client,
    cache: Option<Arc<dyn PageCache>>,
}

impl std::fmt::Debug for LocalFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFetcher")
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl LocalFetcher {
    pub fn new(cache: Option<Arc<dyn PageCache>>) -> Result<Self> {
        Self::with_user_agent(cache, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(cache: Option<Arc<dyn PageCache>>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(Duration::from_secs(10))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client, cache })
    }

    fn is_sensitive_request_header(name: &reqwest::header::HeaderName) -> bool {
        // HeaderName::as_str() is canonical lower-case.
        matches!(
            name.as_str(),
            "authorization" | "cookie" | "proxy-authorization"
        )
    }

    fn apply_headers(
        mut rb: reqwest::RequestBuilder,
        headers: &BTreeMap<String, String>,
    ) -> reqwest::RequestBuilder {
        for (k, v) in headers {
            if let (Ok(name), Ok(value)) = (
                reqwest::header::HeaderName::from_bytes(k.as_bytes()),
                reqwest::header::HeaderValue::from_str(v),
            ) {
                if Self::is_sensitive_request_header(&name) {
                    continue;
                }
                rb = rb.header(name, value);
            }
        }
        rb
    }

    async fn cache_get(&self, req: &FetchRequest) -> Result<Option<CachedPage>> {
        let Some(cache) = self.cache.clone() else {
            return Ok(None);
        };
        if !req.cache.read {
            return Ok(None);
        }
        let key = cache_key(&req.url);
        tokio::task::spawn_blocking(move || cache.get(&key))
            .await
            .map_err(|e| Error::Cache(format!("cache get join failed: {e}")))?
    }

    async fn cache_put(&self, req: &FetchRequest, resp: &FetchResponse) -> Result<()> {
        let Some(cache) = self.cache.clone() else {
            return Ok(());
        };
        if !req.cache.write || resp.status != 200 || resp.truncated {
            return Ok(());
        }
        let key = cache_key(&req.url);
        let ttl = req.cache.ttl();
        let page = CachedPage {
            url: resp.url.clone(),
            final_url: resp.final_url.clone(),
            status: resp.status,
            content_type: resp.content_type.clone(),
            headers: resp.headers.clone(),
            bytes: resp.bytes.clone(),
        };
        tokio::task::spawn_blocking(move || cache.put(&key, &page, ttl))
            .await
            .map_err(|e| Error::Cache(format!("cache put join failed: {e}")))?
    }
}

#[async_trait::async_trait]
impl FetchBackend for LocalFetcher {
    async fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse> {
        let url = req.parsed_url()?;
        let mut timings_ms = BTreeMap::new();

        let t0 = Instant::now();
        let cached = match self.cache_get(req).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %req.url, error = %e, "page cache read failed");
                None
            }
        };
        if let Some(hit) = cached {
            timings_ms.insert("cache_get".to_string(), t0.elapsed().as_millis());
            tracing::debug!(url = %req.url, "page cache hit");
            return Ok(FetchResponse {
                url: req.url.clone(),
                final_url: hit.final_url,
                status: hit.status,
                content_type: hit.content_type,
                headers: hit.headers,
                bytes: hit.bytes,
                truncated: false,
                source: FetchSource::Cache,
                timings_ms,
            });
        }

        let t_req = Instant::now();
        let mut rb = self.client.get(url);
        if let Some(to) = req.timeout() {
            rb = rb.timeout(to);
        }
        rb = Self::apply_headers(rb, &req.headers);
        let resp = rb.send().await.map_err(|e| Error::Fetch(e.to_string()))?;
        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut headers = BTreeMap::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                headers.insert(k.as_str().to_string(), s.to_string());
            }
        }

        let max_bytes = req.max_bytes.unwrap_or(u64::MAX) as usize;
        let mut truncated = false;
        let mut bytes = Vec::new();
        let mut stream = resp.bytes_stream();
        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Fetch(e.to_string()))?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                let can_take = max_bytes.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..can_take]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        timings_ms.insert("network_fetch".to_string(), t_req.elapsed().as_millis());

        let mut out = FetchResponse {
            url: req.url.clone(),
            final_url,
            status,
            content_type,
            headers,
            bytes,
            truncated,
            source: FetchSource::Network,
            timings_ms: BTreeMap::new(),
        };

        let t_put = Instant::now();
        if let Err(e) = self.cache_put(req, &out).await {
            // Cache failures never fail the fetch itself.
            tracing::warn!(url = %req.url, error = %e, "page cache write failed");
        }
        timings_ms.insert("cache_put".to_string(), t_put.elapsed().as_millis());
        out.timings_ms = timings_ms;
        Ok(out)
    }
}
