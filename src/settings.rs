//! Session settings
//!
//! Loaded from a JSON file; every field has a default so a settings file
//! only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};
use crate::layers::{LayerConfig, DEFAULT_RESIZE_FACTOR};
use crate::state::archive::DEFAULT_GLOBAL_NAME;
use crate::state::{AssetSource, DirAssetSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global the player reads the scene from (`window.<name>`)
    pub global_name: String,
    /// Player bundle asset name
    pub player_bundle: String,
    /// Player host page asset name
    pub player_html: String,
    /// File name offered for the downloaded archive
    pub archive_name: String,
    /// Directory the player assets are read from
    pub asset_dir: PathBuf,
    /// Base URL to fetch player assets from instead of `asset_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_base_url: Option<String>,
    /// Per-request timeout for HTTP asset fetches
    pub fetch_timeout_secs: u64,
    /// Viewport pixels -> surface size multiplier
    pub resize_factor: f64,
    /// Viewport used until the render side reports one
    pub viewport: [f64; 2],
    /// Config new mirror layers and colour updates start from
    pub default_layer: LayerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_name: DEFAULT_GLOBAL_NAME.to_string(),
            player_bundle: "player.bundle.js".to_string(),
            player_html: "index.player.html".to_string(),
            archive_name: "export.zip".to_string(),
            asset_dir: PathBuf::from("."),
            asset_base_url: None,
            fetch_timeout_secs: 10,
            resize_factor: DEFAULT_RESIZE_FACTOR,
            viewport: [1280.0, 800.0],
            default_layer: LayerConfig::default_mirror(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StrataError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(StrataError::parse)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Where the archive export fetches the player from
    pub fn asset_source(&self) -> Result<Box<dyn AssetSource>> {
        match &self.asset_base_url {
            #[cfg(feature = "http-assets")]
            Some(url) => {
                let timeout = std::time::Duration::from_secs(self.fetch_timeout_secs);
                Ok(Box::new(crate::state::HttpAssetSource::new(url.clone(), timeout)?))
            }
            #[cfg(not(feature = "http-assets"))]
            Some(url) => {
                log::warn!(
                    "Ignoring asset_base_url {} (built without http-assets), using {}",
                    url,
                    self.asset_dir.display()
                );
                Ok(Box::new(DirAssetSource::new(self.asset_dir.clone())))
            }
            None => Ok(Box::new(DirAssetSource::new(self.asset_dir.clone()))),
        }
    }
}
