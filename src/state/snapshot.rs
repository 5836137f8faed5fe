//! Snapshot Schema
//!
//! `ExportedState` is the portable, human-editable form of a whole session.
//! Camera and clock parameters are carried as opaque JSON because only the
//! render side knows their shape; unknown top-level fields are preserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layers::{BlendMode, LayerConfig, LayerKind, LayerRegistry};
use crate::scene::SceneFuzz;

/// One layer inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLayer {
    #[serde(rename = "type")]
    pub kind: LayerKind,

    #[serde(default)]
    pub blend: BlendMode,

    #[serde(default)]
    pub config: LayerConfig,

    /// Present iff `kind` is `fss-mirror`
    #[serde(rename = "sceneFuzz", default)]
    pub scene_fuzz: Option<SceneFuzz>,
}

/// Full snapshot of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedState {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub theta: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub size: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub origin: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub mouse: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub now: Value,

    #[serde(default)]
    pub layers: Vec<ExportedLayer>,

    /// Unknown fields preserved for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: Map<String, Value>,
}

impl ExportedState {
    /// Same globals, no layers
    pub fn without_layers(&self) -> Self {
        Self {
            layers: Vec::new(),
            ..self.clone()
        }
    }

    /// The partial state a render side would hand to export: globals from
    /// `self`, one bare entry per registry layer
    pub fn with_registry_layers(&self, registry: &LayerRegistry) -> Self {
        let layers = registry
            .iter()
            .map(|layer| ExportedLayer {
                kind: layer.kind.clone(),
                blend: layer.blend.clone(),
                config: LayerConfig::empty(),
                scene_fuzz: None,
            })
            .collect();
        Self {
            layers,
            ..self.without_layers()
        }
    }

    /// Colon-joined blend modes, as used in the `#blends=` fragment
    pub fn merged_blends(&self) -> String {
        merge_blends(self.layers.iter().map(|layer| &layer.blend))
    }
}

pub fn merge_blends<'a>(blends: impl Iterator<Item = &'a BlendMode>) -> String {
    blends
        .map(BlendMode::encoded)
        .collect::<Vec<_>>()
        .join(":")
}

/// Shareable URL fragment for a list of blends
pub fn blends_fragment<'a>(blends: impl Iterator<Item = &'a BlendMode>) -> String {
    format!("#blends={}", merge_blends(blends))
}

/// Layer entry of the sanitized state sent to the render side on import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLayer {
    #[serde(rename = "type_")]
    pub kind: LayerKind,
    pub blend: BlendMode,
    /// Always blank; configs follow per layer
    pub config: String,
}

/// Sanitized global state: layer configs blanked, no fuzz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportWire {
    pub theta: Value,
    pub size: Value,
    pub origin: Value,
    pub mouse: Value,
    pub now: Value,
    pub layers: Vec<WireLayer>,
}

impl From<&ExportedState> for ImportWire {
    fn from(state: &ExportedState) -> Self {
        Self {
            theta: state.theta.clone(),
            size: state.size.clone(),
            origin: state.origin.clone(),
            mouse: state.mouse.clone(),
            now: state.now.clone(),
            layers: state
                .layers
                .iter()
                .map(|layer| WireLayer {
                    kind: layer.kind.clone(),
                    blend: layer.blend.clone(),
                    config: String::new(),
                })
                .collect(),
        }
    }
}
