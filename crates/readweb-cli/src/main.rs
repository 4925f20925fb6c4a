use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use readweb_core::{FetchCachePolicy, FetchRequest, PageCache, SearchProvider, SearchQuery};
use readweb_local::{fetch::DEFAULT_USER_AGENT, search, DuckDuckGoSearch, FsCache, LocalFetcher};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "readweb")]
#[command(about = "Readable Markdown from arbitrary web pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL and print its main content as Markdown.
    Scrape(ScrapeCmd),
    /// Extract main content from local HTML (file or stdin); no network.
    Extract(ExtractCmd),
    /// Fetch a URL and print its title/description/image metadata.
    Metadata(MetadataCmd),
    /// Web search via DuckDuckGo's HTML results page.
    Search(SearchCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
    /// Network timeout.
    #[arg(long, env = "READWEB_TIMEOUT_MS", default_value_t = 15_000)]
    timeout_ms: u64,
    /// Hard cap on response body bytes.
    #[arg(long, env = "READWEB_MAX_BYTES", default_value_t = 5_000_000)]
    max_bytes: u64,
    /// Page cache directory (default: <tmp>/readweb-cache).
    #[arg(long, env = "READWEB_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
    /// Lifetime of cached pages.
    #[arg(long, env = "READWEB_CACHE_TTL_S", default_value_t = readweb_core::DEFAULT_CACHE_TTL_S)]
    cache_ttl_s: u64,
    /// Disable cache reads and writes.
    #[arg(long)]
    no_cache: bool,
    #[arg(long, env = "READWEB_USER_AGENT")]
    user_agent: Option<String>,
}

impl FetchArgs {
    fn request(&self, url: &str) -> FetchRequest {
        let cache = if self.no_cache {
            FetchCachePolicy::disabled()
        } else {
            FetchCachePolicy {
                read: true,
                write: true,
                ttl_s: Some(self.cache_ttl_s),
            }
        };
        FetchRequest {
            url: url.to_string(),
            timeout_ms: Some(self.timeout_ms),
            max_bytes: Some(self.max_bytes),
            headers: Default::default(),
            cache,
        }
    }

    fn fetcher(&self) -> Result<LocalFetcher> {
        let cache: Option<Arc<dyn PageCache>> = if self.no_cache {
            None
        } else {
            let dir = self
                .cache_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("readweb-cache"));
            let fs: Arc<dyn PageCache> = Arc::new(FsCache::new(dir));
            Some(fs)
        };
        let ua = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        Ok(LocalFetcher::with_user_agent(cache, ua)?)
    }
}

#[derive(clap::Args, Debug)]
struct ScrapeCmd {
    url: String,
    #[command(flatten)]
    fetch: FetchArgs,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct ExtractCmd {
    /// HTML file to read (default: stdin).
    #[arg(long)]
    file: Option<PathBuf>,
    /// Base URL for resolving relative links.
    #[arg(long, default_value = "")]
    base_url: String,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct MetadataCmd {
    url: String,
    #[command(flatten)]
    fetch: FetchArgs,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    query: String,
    #[arg(long, default_value_t = search::DEFAULT_MAX_RESULTS)]
    max_results: usize,
    #[arg(long, env = "READWEB_TIMEOUT_MS", default_value_t = 15_000)]
    timeout_ms: u64,
    /// Results page endpoint.
    #[arg(
        long,
        env = "READWEB_SEARCH_ENDPOINT",
        default_value = search::DUCKDUCKGO_HTML_ENDPOINT
    )]
    endpoint: String,
    #[arg(long, env = "READWEB_USER_AGENT")]
    user_agent: Option<String>,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn is_text(output: &str) -> bool {
    output.eq_ignore_ascii_case("text")
}

/// Load `KEY=VALUE` lines from `READWEB_ENV_FILE` without overriding the process env.
fn load_env_file() {
    let Ok(p) = std::env::var("READWEB_ENV_FILE") else {
        return;
    };
    let p = p.trim();
    if p.is_empty() {
        return;
    }
    let Ok(txt) = std::fs::read_to_string(p) else {
        return;
    };
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        if std::env::var_os(k).is_none() {
            std::env::set_var(k, v.trim());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("READWEB_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "readweb starting");

    match cli.command {
        Commands::Scrape(args) => {
            let fetcher = args.fetch.fetcher()?;
            let req = args.fetch.request(&args.url);
            let resp = readweb_local::scrape_url(&fetcher, &req)
                .await
                .with_context(|| format!("scrape {}", args.url))?;
            if is_text(&args.output) {
                println!("{}", resp.content);
            } else {
                println!("{}", serde_json::to_string(&resp)?);
            }
        }
        Commands::Extract(args) => {
            let html = match &args.file {
                Some(p) => std::fs::read_to_string(p)
                    .with_context(|| format!("read {}", p.display()))?,
                None => {
                    let mut s = String::new();
                    std::io::stdin()
                        .read_to_string(&mut s)
                        .context("read stdin")?;
                    s
                }
            };
            let resp = readweb_local::scrape_html(&html, &args.base_url);
            if let Some(e) = &resp.error {
                anyhow::bail!("extract failed: {e}");
            }
            if is_text(&args.output) {
                println!("{}", resp.content);
            } else {
                println!("{}", serde_json::to_string(&resp)?);
            }
        }
        Commands::Metadata(args) => {
            let fetcher = args.fetch.fetcher()?;
            let req = args.fetch.request(&args.url);
            let meta = readweb_local::metadata_url(&fetcher, &req)
                .await
                .with_context(|| format!("metadata {}", args.url))?;
            if is_text(&args.output) {
                let v = serde_json::to_value(&meta)?;
                if let Some(obj) = v.as_object() {
                    for (k, v) in obj {
                        println!("{k}: {}", v.as_str().unwrap_or_default());
                    }
                }
            } else {
                println!("{}", serde_json::to_string(&meta)?);
            }
        }
        Commands::Search(args) => {
            let ua = args.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
            let provider = DuckDuckGoSearch::with_endpoint(args.endpoint.clone(), ua)?;
            let q = SearchQuery {
                query: args.query.clone(),
                max_results: Some(args.max_results),
                timeout_ms: Some(args.timeout_ms),
            };
            let resp = provider
                .search(&q)
                .await
                .with_context(|| format!("search {:?}", args.query))?;
            if is_text(&args.output) {
                for r in &resp.results {
                    println!("{}\n{}\n{}\n", r.title, r.url, r.snippet);
                }
            } else {
                println!("{}", serde_json::to_string(&resp)?);
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "readweb",
                "version": env!("CARGO_PKG_VERSION"),
            });
            if is_text(&args.output) {
                println!("readweb {}", env!("CARGO_PKG_VERSION"));
            } else {
                println!("{}", v);
            }
        }
    }

    Ok(())
}
