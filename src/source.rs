use crate::error::{ReadalongError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timeout for a single asset request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Somewhere text assets (catalog, transcripts) can be fetched from by relative path.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Fetches assets over HTTP relative to a base URL.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Join the base URL and a relative path. Absolute URLs pass through unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl AssetSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ReadalongError::NotFound(url));
        }
        if !status.is_success() {
            return Err(ReadalongError::Source(format!("{} returned {}", url, status)));
        }

        Ok(response.text().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Reads assets from a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AssetSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.path_for(path);
        debug!("Reading {:?}", full_path);

        match tokio::fs::read_to_string(&full_path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ReadalongError::NotFound(
                full_path.display().to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

/// Pick a source for a location string: URLs are fetched over HTTP, anything else is a directory.
pub fn from_location(location: &str) -> Arc<dyn AssetSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpSource::new(location))
    } else {
        Arc::new(DirSource::new(location))
    }
}
