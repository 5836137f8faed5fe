//! Archive Packaging
//!
//! Bundles an exported snapshot with the standalone player into a zip:
//!
//! ```text
//! export.zip
//!   player.bundle.js   # player, copied as-is
//!   index.html         # host page, copied as-is
//!   scene.js           # window.<globalName> = <snapshot json>;
//! ```

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, StrataError};

pub const PLAYER_BUNDLE_ENTRY: &str = "player.bundle.js";
pub const INDEX_ENTRY: &str = "index.html";
pub const SCENE_ENTRY: &str = "scene.js";

/// Global the player reads the scene from
pub const DEFAULT_GLOBAL_NAME: &str = "jsGenScene";

/// Script that hands the snapshot to the player
pub fn scene_script(global_name: &str, scene_json: &str) -> String {
    format!("window.{} = {};", global_name, scene_json)
}

/// Zip the player files and the snapshot script
pub fn package(
    global_name: &str,
    scene_json: &str,
    player_bundle: &[u8],
    player_html: &[u8],
) -> Result<Vec<u8>> {
    let script = scene_script(global_name, scene_json);
    let entries: [(&str, &[u8]); 3] = [
        (PLAYER_BUNDLE_ENTRY, player_bundle),
        (SCENE_ENTRY, script.as_bytes()),
        (INDEX_ENTRY, player_html),
    ];

    let packaging = |e: &dyn std::fmt::Display| StrataError::Packaging {
        reason: e.to_string(),
    };
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer.start_file(name, options).map_err(|e| packaging(&e))?;
        writer.write_all(bytes).map_err(|e| packaging(&e))?;
    }
    let archive = writer.finish().map_err(|e| packaging(&e))?.into_inner();

    info!("Packaged archive: {} bytes", archive.len());
    Ok(archive)
}

/// Guards the archive export so only one runs at a time
///
/// Clones share the same flag, so a host can hand one to each caller.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: Arc<AtomicBool>,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the exclusive section, or fail with `ExportInProgress`
    pub fn try_acquire(&self) -> Result<ExportPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StrataError::ExportInProgress)?;
        Ok(ExportPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one export; releases the gate on drop
#[derive(Debug)]
pub struct ExportPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
