use readweb_core::PageMetadata;
use std::collections::BTreeMap;

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(s: Option<&String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Guess an image MIME type from its URL.
pub fn image_content_type(image_url: &str) -> Option<&'static str> {
    let lc = image_url.to_ascii_lowercase();
    if lc.contains(".gif") {
        Some("image/gif")
    } else if lc.contains(".jpg") || lc.contains(".jpeg") {
        Some("image/jpeg")
    } else if lc.contains(".png") {
        Some("image/png")
    } else {
        None
    }
}

/// Short provider label for a page host ("Tenor", "Giphy", or the first host label).
pub fn provider_for_host(host: &str) -> String {
    if host.contains("tenor.com") {
        "Tenor".to_string()
    } else if host.contains("giphy.com") {
        "Giphy".to_string()
    } else {
        host.split('.').next().unwrap_or("").to_string()
    }
}

/// Scan `<meta>`/`<title>` tags for Open Graph and Twitter Card metadata.
///
/// Preference order: Open Graph, then Twitter Card, then plain HTML.
pub fn extract_metadata(html: &str, page_url: &str) -> PageMetadata {
    let doc = html_scraper::Html::parse_document(html);

    let mut tags: BTreeMap<String, String> = BTreeMap::new();
    if let Ok(sel) = html_scraper::Selector::parse("meta") {
        for el in doc.select(&sel) {
            let v = el.value();
            let content = v.attr("content").unwrap_or("").to_string();
            if let Some(p) = v.attr("property").filter(|p| p.starts_with("og:")) {
                tags.entry(p.to_string()).or_insert_with(|| content.clone());
            }
            if let Some(n) = v.attr("name") {
                if n.starts_with("twitter:") || n.eq_ignore_ascii_case("description") {
                    tags.entry(n.to_ascii_lowercase()).or_insert(content);
                }
            }
        }
    }

    let title_tag = html_scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(|el| norm_ws(&el.text().collect::<String>())))
        .filter(|t| !t.is_empty());

    let title = non_empty(tags.get("og:title"))
        .or_else(|| non_empty(tags.get("twitter:title")))
        .or(title_tag);
    let description = non_empty(tags.get("og:description"))
        .or_else(|| non_empty(tags.get("twitter:description")))
        .or_else(|| non_empty(tags.get("description")));
    let image_url =
        non_empty(tags.get("og:image")).or_else(|| non_empty(tags.get("twitter:image")));

    let (content_type, provider) = match &image_url {
        Some(img) => {
            let host = url::Url::parse(page_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            (
                image_content_type(img).map(str::to_string),
                Some(provider_for_host(&host)).filter(|p| !p.is_empty()),
            )
        }
        None => (None, None),
    };

    PageMetadata {
        url: page_url.to_string(),
        title,
        description,
        image_url,
        content_type,
        provider,
    }
}
