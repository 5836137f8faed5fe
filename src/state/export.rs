//! Exporter
//!
//! Fills a caller-supplied partial state with the registry's configs and
//! each mirror layer's fuzz.
//!
//! Fuzz resolution is two-tier: the cached scene wins, a rebuild from the
//! registry config covers a cache miss. The cache is best effort, so the
//! fallback is expected rather than exceptional. Builds without fuzz are
//! seeded from the config, so the fallback reproduces the cached surface
//! whenever the cache was built from the same config.

use log::{debug, warn};

use super::snapshot::ExportedState;
use crate::error::{Result, StrataError};
use crate::layers::{LayerConfig, LayerRegistry};
use crate::scene::{self, SceneCache, SceneFuzz};

/// Fill `partial` in place from the registry and cache
pub fn fill_snapshot(
    mut partial: ExportedState,
    registry: &LayerRegistry,
    cache: &SceneCache,
) -> ExportedState {
    for (index, layer) in partial.layers.iter_mut().enumerate() {
        layer.config = registry
            .get(index)
            .map(|entry| entry.config.clone())
            .unwrap_or_else(LayerConfig::empty);

        layer.scene_fuzz = if layer.kind.has_geometry() {
            Some(resolve_fuzz(index, &layer.config, cache))
        } else {
            None
        };
    }
    partial
}

fn resolve_fuzz(index: usize, config: &LayerConfig, cache: &SceneCache) -> SceneFuzz {
    if let Some(scene) = cache.get(index) {
        return scene.flatten();
    }
    debug!("No cached scene for layer {}, rebuilding for export", index);
    match scene::build(config, None) {
        Ok(scene) => scene.flatten(),
        Err(e) => {
            warn!("Layer {} exported without geometry: {}", index, e);
            SceneFuzz::default()
        }
    }
}

/// Parse `current_state_json`, fill it and render pretty JSON
///
/// Malformed input is a `Parse` error. Never mutates the registry or cache.
pub fn export_state(
    current_state_json: &str,
    registry: &LayerRegistry,
    cache: &SceneCache,
) -> Result<String> {
    let partial: ExportedState =
        serde_json::from_str(current_state_json).map_err(StrataError::parse)?;
    let filled = fill_snapshot(partial, registry, cache);
    Ok(serde_json::to_string_pretty(&filled)?)
}
