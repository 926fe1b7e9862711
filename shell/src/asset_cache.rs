//! Asset Cache
//!
//! Offline cache for the page's static assets. [`AssetCache::install`]
//! precaches a fixed list all-or-nothing; [`AssetCache::fetch`] serves from
//! the cache first and falls back to the network without storing the result.
//! Bumping [`CACHE_NAME`] invalidates a previous install.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use thiserror::Error;
use tracing::{debug, info};

use oria_core::config::ServerConfig;

/// Cache bucket name
pub const CACHE_NAME: &str = "oria-cache-v12";

/// Assets stored on install
pub const PRECACHE: [&str; 4] = [
    "/",
    "/static/css/style.css",
    "/static/js/script.js",
    "/static/img/mascot.png",
];

/// Failure fetching an asset
#[derive(Debug, Error)]
pub enum AssetError {
    /// The request never produced a response
    #[error("request for {path} failed: {source}")]
    Fetch {
        /// Asset path
        path: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status
    #[error("{path} returned status {status}")]
    Status {
        /// Asset path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// The HTTP client could not be built
    #[error("asset client setup failed: {0}")]
    Setup(String),
}

/// Where cache misses are fetched from
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the bytes of `path`
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Asset source over HTTP against the ORIA server
#[derive(Clone, Debug)]
pub struct HttpAssetSource {
    base_url: String,
    timeout: Option<Duration>,
    http_client: reqwest::Client,
}

impl HttpAssetSource {
    /// Source for the configured server
    pub fn from_config(config: &ServerConfig) -> Result<Self, AssetError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AssetError::Setup(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| AssetError::Setup(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            http_client,
        })
    }

    /// Per-request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let url = format!("{}{path}", self.base_url);
        let fetch_error = |source| AssetError::Fetch {
            path: path.to_string(),
            source,
        };

        let response = self.http_client.get(&url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}

/// A served asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Contents
    pub bytes: Vec<u8>,
    /// Whether the cache answered
    pub from_cache: bool,
}

/// Cache-first asset store
pub struct AssetCache<S> {
    name: String,
    entries: DashMap<String, Vec<u8>>,
    source: S,
}

impl<S: AssetSource> AssetCache<S> {
    /// Empty cache named [`CACHE_NAME`]
    pub fn new(source: S) -> Self {
        Self::with_name(CACHE_NAME, source)
    }

    /// Empty cache with a custom bucket name
    pub fn with_name(name: impl Into<String>, source: S) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            source,
        }
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cached assets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` is cached
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Precache [`PRECACHE`]
    pub async fn install(&self) -> Result<usize, AssetError> {
        self.install_paths(&PRECACHE).await
    }

    /// Precache `paths`. Nothing is stored unless every fetch succeeds.
    pub async fn install_paths(&self, paths: &[&str]) -> Result<usize, AssetError> {
        let mut fetched = Vec::with_capacity(paths.len());
        for path in paths {
            fetched.push(((*path).to_string(), self.source.fetch(path).await?));
        }

        let count = fetched.len();
        for (path, bytes) in fetched {
            self.entries.insert(path, bytes);
        }
        info!(cache = %self.name, count, "Assets precached");
        Ok(count)
    }

    /// Serve `path`, cache first
    pub async fn fetch(&self, path: &str) -> Result<Asset, AssetError> {
        if let Some(bytes) = self.entries.get(path) {
            debug!(path, "Asset cache hit");
            return Ok(Asset {
                bytes: bytes.value().clone(),
                from_cache: true,
            });
        }

        debug!(path, "Asset cache miss");
        let bytes = self.source.fetch(path).await?;
        Ok(Asset {
            bytes,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    /// Serves a fixed map and counts fetches
    struct CountingSource {
        assets: HashMap<String, Vec<u8>>,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new(paths: &[&str]) -> Self {
            Self {
                assets: paths
                    .iter()
                    .map(|p| ((*p).to_string(), p.as_bytes().to_vec()))
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssetSource for CountingSource {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.assets.get(path).cloned().ok_or(AssetError::Status {
                path: path.to_string(),
                status: 404,
            })
        }
    }

    #[tokio::test]
    async fn test_install_then_serve_from_cache() {
        let cache = AssetCache::new(CountingSource::new(&PRECACHE));
        assert_eq!(cache.name(), "oria-cache-v12");
        assert_eq!(assert_ok!(cache.install().await), 4);
        assert_eq!(cache.source.count(), 4);

        let asset = cache.fetch("/static/css/style.css").await.unwrap();
        assert!(asset.from_cache);
        assert_eq!(asset.bytes, b"/static/css/style.css".to_vec());
        assert_eq!(cache.source.count(), 4);
    }

    #[tokio::test]
    async fn test_miss_goes_to_network_without_storing() {
        let cache = AssetCache::new(CountingSource::new(&["/static/img/IMG_8472.png"]));

        let asset = cache.fetch("/static/img/IMG_8472.png").await.unwrap();
        assert!(!asset.from_cache);
        assert!(!cache.contains("/static/img/IMG_8472.png"));

        cache.fetch("/static/img/IMG_8472.png").await.unwrap();
        assert_eq!(cache.source.count(), 2);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let cache = AssetCache::new(CountingSource::new(&["/", "/static/css/style.css"]));
        let err = assert_err!(cache.install().await);
        assert!(matches!(err, AssetError::Status { status: 404, .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stall = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ServerConfig {
            base_url: format!("http://{addr}/"),
            session_cookie: None,
            request_timeout_secs: Some(1),
        };
        let source = assert_ok!(HttpAssetSource::from_config(&config));
        assert_eq!(source.timeout(), Some(Duration::from_secs(1)));

        let fetched = tokio::time::timeout(Duration::from_secs(10), source.fetch("/")).await;
        let err = assert_err!(assert_ok!(fetched));
        match err {
            AssetError::Fetch { path, source: e } => {
                assert_eq!(path, "/");
                assert!(e.is_timeout(), "{e}");
            }
            other => panic!("expected a fetch timeout, got {other:?}"),
        }
        stall.abort();
    }
}
