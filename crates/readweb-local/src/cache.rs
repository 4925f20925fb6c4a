use readweb_core::{CachedPage, Error, PageCache, Result};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Cache key for a page URL: lowercase hex SHA-256 of the URL.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

fn now_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

/// In-process cache with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, CachedPage)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CachedPage>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::Cache(e.to_string()))?;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some((expires_at, _)) => Instant::now() >= *expires_at,
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|(_, page)| page.clone()))
    }

    fn put(&self, key: &str, page: &CachedPage, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::Cache(e.to_string()))?;
        let now = Instant::now();
        entries.retain(|_, (expires_at, _)| now < *expires_at);
        entries.insert(key.to_string(), (now + ttl, page.clone()));
        Ok(())
    }
}

/// On-disk cache: `<key>.json` metadata plus `<key>.bin` body, sharded by key prefix.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn cache_meta_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        // Never persist Set-Cookie and friends.
        let mut out = BTreeMap::new();
        for (k, v) in headers {
            match k.trim().to_ascii_lowercase().as_str() {
                "content-type" | "content-length" | "etag" | "last-modified" | "cache-control" => {
                    out.insert(k.clone(), v.clone());
                }
                _ => {}
            }
        }
        out
    }

    fn paths(&self, key: &str) -> Result<(PathBuf, PathBuf)> {
        if key.len() < 4 || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Cache(format!("unsupported cache key: {key:?}")));
        }
        let dir = self.root.join(&key[0..2]).join(&key[2..4]);
        Ok((dir.join(format!("{key}.json")), dir.join(format!("{key}.bin"))))
    }
}

impl PageCache for FsCache {
    fn get(&self, key: &str) -> Result<Option<CachedPage>> {
        let (meta_p, body_p) = self.paths(key)?;
        if !meta_p.exists() || !body_p.exists() {
            return Ok(None);
        }
        let meta_bytes = fs::read(&meta_p).map_err(|e| Error::Cache(e.to_string()))?;
        let meta: serde_json::Value =
            serde_json::from_slice(&meta_bytes).map_err(|e| Error::Cache(e.to_string()))?;

        let stored_at = meta
            .get("stored_at_epoch_s")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let ttl_s = meta.get("ttl_s").and_then(|v| v.as_u64()).unwrap_or(0);
        if now_epoch_s().saturating_sub(stored_at) >= ttl_s {
            return Ok(None);
        }

        let str_field = |name: &str| {
            meta.get(name)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        let mut headers = BTreeMap::new();
        if let Some(h) = meta.get("headers").and_then(|v| v.as_object()) {
            for (k, v) in h {
                if let Some(s) = v.as_str() {
                    headers.insert(k.clone(), s.to_string());
                }
            }
        }
        let url = str_field("url").unwrap_or_default();
        Ok(Some(CachedPage {
            final_url: str_field("final_url").unwrap_or_else(|| url.clone()),
            url,
            status: meta.get("status").and_then(|v| v.as_u64()).unwrap_or(0) as u16,
            content_type: str_field("content_type"),
            headers,
            bytes: fs::read(&body_p).map_err(|e| Error::Cache(e.to_string()))?,
        }))
    }

    fn put(&self, key: &str, page: &CachedPage, ttl: Duration) -> Result<()> {
        let (meta_p, body_p) = self.paths(key)?;
        if let Some(parent) = meta_p.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Cache(e.to_string()))?;
        }
        let meta = serde_json::json!({
            "schema_version": 1,
            "stored_at_epoch_s": now_epoch_s(),
            "ttl_s": ttl.as_secs(),
            "url": page.url,
            "final_url": page.final_url,
            "status": page.status,
            "content_type": page.content_type,
            "headers": Self::cache_meta_headers(&page.headers),
        });
        fs::write(&body_p, &page.bytes).map_err(|e| Error::Cache(e.to_string()))?;
        fs::write(
            &meta_p,
            serde_json::to_vec(&meta).map_err(|e| Error::Cache(e.to_string()))?,
        )
        .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }
}
