use crate::fetch::DEFAULT_USER_AGENT;
use readweb_core::{Error, Result, SearchProvider, SearchQuery, SearchResponse, SearchResult};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// DuckDuckGo's JavaScript-free results page.
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_MAX_RESULTS: usize = 10;

fn timeout_ms_from_query(q: &SearchQuery) -> u64 {
    q.timeout_ms.unwrap_or(15_000).clamp(1_000, 60_000)
}

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_result_block(el: &html_scraper::node::Element) -> bool {
    el.name() == "div" && el.classes().any(|c| c == "result" || c == "web-result")
}

/// Unwrap a `/l/?uddg=<target>` redirect link; other hrefs pass through.
pub fn unwrap_redirect(href: &str) -> String {
    let href = href.trim();
    let Ok(base) = url::Url::parse("https://duckduckgo.com/") else {
        return href.to_string();
    };
    match base.join(href) {
        Ok(u) if u.path() == "/l/" => u
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default(),
        _ => href.to_string(),
    }
}

/// Pull organic results out of a DuckDuckGo HTML results page.
///
/// Each `div.result` / `div.web-result` block yields one result: the title and
/// target come from its `a.result__a`, the snippet from its first
/// `.result__snippet`. Sponsored (`duckduckgo.com/y.js`) and link-less blocks
/// are skipped.
pub fn parse_search_results(html: &str) -> Vec<SearchResult> {
    let doc = html_scraper::Html::parse_document(html);
    let (Ok(blocks), Ok(title_sel), Ok(snippet_sel)) = (
        html_scraper::Selector::parse("div.result, div.web-result"),
        html_scraper::Selector::parse("a.result__a"),
        html_scraper::Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for block in doc.select(&blocks) {
        let nested = block
            .ancestors()
            .any(|a| a.value().as_element().is_some_and(is_result_block));
        if nested {
            continue;
        }
        let Some(link) = block.select(&title_sel).next() else {
            continue;
        };
        let url = link
            .value()
            .attr("href")
            .map(unwrap_redirect)
            .unwrap_or_default();
        if url.is_empty() || url.contains("duckduckgo.com/y.js") {
            continue;
        }
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(|s| norm_ws(&s.text().collect::<String>()))
            .unwrap_or_default();
        out.push(SearchResult {
            title: norm_ws(&link.text().collect::<String>()),
            url,
            snippet,
        });
    }
    out
}

/// Web search by scraping DuckDuckGo's HTML endpoint. Needs no API key.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DUCKDUCKGO_HTML_ENDPOINT, DEFAULT_USER_AGENT)
    }

    /// The HTML endpoint rejects unknown agents, so a browser UA is required.
    pub fn with_endpoint(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Search(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        if q.query.trim().is_empty() {
            return Err(Error::Search("query is required".to_string()));
        }
        let t0 = Instant::now();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", q.query.as_str())])
            .timeout(Duration::from_millis(timeout_ms_from_query(q)))
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;
        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::Search(format!("search returned status: {status}")));
        }
        let body = resp.text().await.map_err(|e| Error::Search(e.to_string()))?;

        let mut results = parse_search_results(&body);
        results.truncate(q.max_results.unwrap_or(DEFAULT_MAX_RESULTS));
        tracing::debug!(query = %q.query, results = results.len(), "search done");

        let mut timings_ms = BTreeMap::new();
        timings_ms.insert("search".to_string(), t0.elapsed().as_millis());
        Ok(SearchResponse {
            query: q.query.clone(),
            results,
            provider: self.name().to_string(),
            timings_ms,
        })
    }
}
