//! Player asset sources
//!
//! The archive export bundles a standalone player that lives outside this
//! crate. Assets are fetched by name through an `AssetSource`; any failure
//! is an `AssetFetch` error so the export aborts early.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, StrataError};

/// Somewhere the static player files can be fetched from
pub trait AssetSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reads assets from a local directory
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        debug!("Fetching asset {}", path.display());
        fs::read(&path).map_err(|e| StrataError::AssetFetch {
            asset: name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

/// Fetches assets over HTTP relative to a base URL
#[cfg(feature = "http-assets")]
pub struct HttpAssetSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http-assets")]
impl HttpAssetSource {
    /// `timeout` bounds each request so a dead host fails fast
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StrataError::AssetFetch {
                asset: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}

#[cfg(feature = "http-assets")]
impl AssetSource for HttpAssetSource {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.url_for(name);
        debug!("Fetching asset {}", url);
        let fetch_error = |reason: String| StrataError::AssetFetch {
            asset: name.to_string(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
