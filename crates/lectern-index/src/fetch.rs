//! Fetching collection resources from a directory or a web server.

use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use crate::IndexError;

/// Retrieves resources by path relative to a collection root.
///
/// Paths always use `/` separators, for example `kjv/index/_3.json`.
pub trait ResourceFetcher: Send + Sync {
    /// Fetches the resource at `path` as text.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, IndexError>> + Send;
}

/// Fetches and decodes a JSON resource.
pub async fn fetch_json<F, T>(fetcher: &F, path: &str) -> Result<T, IndexError>
where
    F: ResourceFetcher,
    T: DeserializeOwned,
{
    let body = fetcher.fetch(path).await?;
    serde_json::from_str(&body).map_err(|source| IndexError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Reads resources from a local directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    /// Directory containing one subdirectory per collection.
    root: PathBuf,
}

impl FsFetcher {
    /// Creates a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<String, IndexError> {
        let full = path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |dir, part| dir.join(part));
        debug!(path = %full.display(), "reading resource");
        match fs::read_to_string(&full).await {
            Ok(body) => Ok(body),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(IndexError::NotFound {
                path: path.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

/// Retrieves resources over HTTP from a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Shared connection pool.
    client: Client,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl HttpFetcher {
    /// Creates a fetcher for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::fetch(base_url, &e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL of `path`.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String, IndexError> {
        let url = self.url(path);
        debug!(%url, "fetching resource");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IndexError::fetch(&url, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(IndexError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(IndexError::Fetch {
                path: url,
                message: format!("HTTP {status}"),
            });
        }

        response.text().await.map_err(|e| IndexError::fetch(&url, &e))
    }
}

/// A fetcher chosen at runtime from a configured base location.
#[derive(Debug, Clone)]
pub enum Fetcher {
    /// Local directory.
    Fs(FsFetcher),
    /// Web server.
    Http(HttpFetcher),
}

impl Fetcher {
    /// Picks an HTTP fetcher for `http://` and `https://` bases and a directory fetcher
    /// otherwise.
    pub fn from_base(base: &str, timeout: Duration) -> Result<Self, IndexError> {
        if is_url(base) {
            HttpFetcher::new(base, timeout).map(Self::Http)
        } else {
            Ok(Self::Fs(FsFetcher::new(base)))
        }
    }
}

impl ResourceFetcher for Fetcher {
    async fn fetch(&self, path: &str) -> Result<String, IndexError> {
        match self {
            Self::Fs(fetcher) => fetcher.fetch(path).await,
            Self::Http(fetcher) => fetcher.fetch(path).await,
        }
    }
}

/// Returns true if `base` is an HTTP(S) URL.
pub fn is_url(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}
