//! Layer Registry
//!
//! The authoritative ordered list of layers. Indices are the identity used
//! by the scene cache and the render side, and may go stale while an import
//! swaps the whole list, so index-based updates degrade to no-ops.

use log::{debug, warn};

use super::config::LayerConfig;
use super::layer::{BlendMode, Layer, LayerKind};

/// Multiplier from viewport pixels to surface size
pub const DEFAULT_RESIZE_FACTOR: f64 = 2.5;

/// Ordered list of layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Indices of every layer that owns a generated mesh
    pub fn mirror_indices(&self) -> Vec<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.is_mirror())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|layer| layer.kind.clone()).collect()
    }

    pub fn blends(&self) -> Vec<BlendMode> {
        self.layers.iter().map(|layer| layer.blend.clone()).collect()
    }

    /// Replace the whole list (used by import)
    pub fn replace_all(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
    }

    /// Replace the config of layer `index` with `config`
    ///
    /// Takes ownership so the registry never aliases a caller's tree.
    /// Returns `false` for an out-of-range index.
    pub fn update_layer(&mut self, index: usize, config: LayerConfig) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.config = config;
                true
            }
            None => {
                warn!(
                    "Ignoring update for stale layer index {} ({} layers)",
                    index,
                    self.layers.len()
                );
                false
            }
        }
    }

    /// Apply `transform` to a private copy of every mirror layer's config
    ///
    /// Each layer gets its own copy; the old config is swapped out only
    /// once the transform has returned. Returns the updated indices.
    pub fn update_all<F>(&mut self, mut transform: F) -> Vec<usize>
    where
        F: FnMut(LayerConfig) -> LayerConfig,
    {
        let mut updated = Vec::new();
        for (index, layer) in self.layers.iter_mut().enumerate() {
            if layer.is_mirror() {
                layer.config = transform(layer.config.clone());
                updated.push(index);
            }
        }
        debug!("Updated {} mirror layer configs", updated.len());
        updated
    }

    pub fn set_blend(&mut self, index: usize, blend: BlendMode) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.blend = blend;
                true
            }
            None => {
                warn!("Ignoring blend change for stale layer index {}", index);
                false
            }
        }
    }

    /// Produce a new registry sized for a `width` x `height` viewport
    ///
    /// Mirror layers are cloned with `size = [floor(w * factor), floor(h * factor)]`;
    /// other layers are carried over unchanged. `self` is left untouched.
    pub fn resized(&self, width: f64, height: f64, factor: f64) -> Self {
        let size = serde_json::json!([
            (width * factor).floor() as i64,
            (height * factor).floor() as i64
        ]);
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                if layer.is_mirror() {
                    let mut resized = layer.clone();
                    resized.config.set("size", size.clone());
                    resized
                } else {
                    layer.clone()
                }
            })
            .collect();
        Self { layers }
    }
}
