//! Importer
//!
//! Everything an import needs is prepared off to the side first: parse,
//! rebuild every mirror scene, render the sanitized wire state. Only a
//! fully prepared import is swapped into the session, so a bad payload
//! never leaves the registry and cache half replaced.

use log::info;
use rayon::prelude::*;

use super::snapshot::{blends_fragment, ExportedState, ImportWire};
use crate::error::{Result, StrataError};
use crate::layers::{Layer, LayerRegistry};
use crate::scene::{self, SceneCache};

/// A validated import, ready to be swapped in
#[derive(Debug, Clone)]
pub struct PreparedImport {
    /// Parsed snapshot
    pub state: ExportedState,
    /// Registry rebuilt from the snapshot layers
    pub registry: LayerRegistry,
    /// Scenes rebuilt from each mirror layer's config and fuzz
    pub cache: SceneCache,
    /// Sanitized state for the render side
    pub wire: String,
    /// `#blends=...` fragment for the imported layers
    pub fragment: String,
}

/// Parse and rebuild `text` without touching any live state
pub fn prepare_import(text: &str) -> Result<PreparedImport> {
    let state: ExportedState = serde_json::from_str(text).map_err(StrataError::parse)?;

    let scenes = state
        .layers
        .par_iter()
        .enumerate()
        .filter(|(_, layer)| layer.kind.has_geometry())
        .map(|(index, layer)| {
            scene::build(&layer.config, layer.scene_fuzz.as_ref()).map(|scene| (index, scene))
        })
        .collect::<Result<Vec<_>>>()?;

    let registry = LayerRegistry::from_layers(
        state
            .layers
            .iter()
            .map(|layer| {
                Layer::new(layer.kind.clone(), layer.config.clone()).with_blend(layer.blend.clone())
            })
            .collect(),
    );
    let wire = serde_json::to_string(&ImportWire::from(&state))?;
    let fragment = blends_fragment(state.layers.iter().map(|layer| &layer.blend));

    info!(
        "Prepared import: {} layers, {} scenes",
        registry.len(),
        scenes.len()
    );

    Ok(PreparedImport {
        state,
        registry,
        cache: scenes.into_iter().collect(),
        wire,
        fragment,
    })
}
