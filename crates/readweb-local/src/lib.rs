//! Local implementations for `readweb`: the readability engine, page caches,
//! a `reqwest` fetcher, HTML web search, and the scrape/metadata pipelines
//! built on them.

pub mod cache;
pub mod dom;
pub mod fetch;
pub mod metadata;
pub mod pipeline;
pub mod readability;
pub mod search;

pub use cache::{cache_key, FsCache, MemoryCache};
pub use dom::{Document, NodeId, NodeKind};
pub use fetch::LocalFetcher;
pub use metadata::extract_metadata;
pub use pipeline::{metadata_url, scrape_html, scrape_url};
pub use readability::{extract_main_content, extract_markdown};
pub use search::{parse_search_results, DuckDuckGoSearch};
