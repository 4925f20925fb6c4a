use crate::metadata::extract_metadata;
use crate::readability::extract_markdown;
use readweb_core::{
    Error, FetchBackend, FetchRequest, FetchResponse, PageMetadata, Result, ScrapeResponse,
};

/// Run readability over already-fetched HTML.
///
/// A page without usable content yields empty `content`, not an error.
pub fn scrape_html(html: &str, url: &str) -> ScrapeResponse {
    let content = match extract_markdown(html, url) {
        Ok(md) => md,
        Err(Error::ContentNotFound) => {
            tracing::debug!(url, "no readable content");
            String::new()
        }
        Err(e) => {
            return ScrapeResponse {
                url: url.to_string(),
                content: String::new(),
                error: Some(e.to_string()),
            }
        }
    };
    ScrapeResponse {
        url: url.to_string(),
        content,
        error: None,
    }
}

async fn fetch_expecting(
    fetcher: &dyn FetchBackend,
    req: &FetchRequest,
    ok_statuses: &[u16],
) -> Result<FetchResponse> {
    req.parsed_url()?;
    let resp = fetcher.fetch(req).await?;
    if !ok_statuses.contains(&resp.status) {
        return Err(Error::Fetch(format!("url returned status: {}", resp.status)));
    }
    tracing::debug!(
        url = %req.url,
        status = resp.status,
        bytes = resp.bytes.len(),
        source = ?resp.source,
        "fetched page"
    );
    Ok(resp)
}

/// Fetch `req.url` (cache-first) and extract its main content as Markdown.
pub async fn scrape_url(fetcher: &dyn FetchBackend, req: &FetchRequest) -> Result<ScrapeResponse> {
    let resp = fetch_expecting(fetcher, req, &[200]).await?;
    Ok(scrape_html(&resp.text_lossy(), &req.url))
}

/// Fetch `req.url` (cache-first) and scan it for title/description/image metadata.
pub async fn metadata_url(fetcher: &dyn FetchBackend, req: &FetchRequest) -> Result<PageMetadata> {
    let resp = fetch_expecting(fetcher, req, &[200, 202, 203]).await?;
    Ok(extract_metadata(&resp.text_lossy(), &req.url))
}
