//! Layer Configuration
//!
//! A layer config is an arbitrarily nested JSON tree owned by exactly one
//! registry entry. The core treats it as opaque except for the handful of
//! fields the scene builder needs, which are read through typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StrataError};

/// Fallback colour pair for materials and lights
const DEFAULT_COLORS: [&str; 2] = ["#ffffff", "#ffffff"];

/// Upper bound on `(cols + 1) * (rows + 1)`; keeps triangle indices in `u32`
pub const MAX_VERTICES: usize = 1 << 20;

/// Configuration tree for a single layer
///
/// `Clone` is a deep copy: no two registry entries ever share a subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerConfig(Value);

impl Default for LayerConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for LayerConfig {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl LayerConfig {
    /// An empty object, used when the registry has nothing for an index
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// The config a fresh mirrored surface layer starts from
    pub fn default_mirror() -> Self {
        Self(serde_json::json!({
            "lights": {
                "ambient": ["#000000", "#f45b69"],
                "diffuse": ["#000000", "#e4fde1"],
                "speed": 400,
                "count": 2
            },
            "material": ["#ffffff", "#ffffff"],
            "xRange": 0.8,
            "yRange": 0.1,
            "size": [3550, 3200],
            "faces": [35, 35],
            "mirror": 0.5
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// Set a top-level field, turning a non-object config into an object
    pub fn set(&mut self, key: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value);
        }
    }

    /// Set one side of a light colour pair (`lights.<kind>[slot]`)
    pub fn set_light_color(&mut self, kind: &str, slot: usize, color: &str) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        let lights = self
            .0
            .as_object_mut()
            .map(|map| {
                map.entry("lights")
                    .or_insert_with(|| Value::Object(Map::new()))
            });
        let Some(lights) = lights else { return };
        if !lights.is_object() {
            *lights = Value::Object(Map::new());
        }
        let Some(lights) = lights.as_object_mut() else {
            return;
        };
        let pair = lights
            .entry(kind)
            .or_insert_with(|| serde_json::json!(DEFAULT_COLORS));
        if !pair.is_array() {
            *pair = serde_json::json!(DEFAULT_COLORS);
        }
        if let Some(items) = pair.as_array_mut() {
            while items.len() <= slot {
                items.push(Value::String(DEFAULT_COLORS[0].to_string()));
            }
            items[slot] = Value::String(color.to_string());
        }
    }

    /// Surface size in world units (`size: [w, h]`)
    pub fn size(&self) -> Result<[f64; 2]> {
        let value = self.0.get("size").ok_or_else(|| StrataError::missing("size"))?;
        let size = number_pair("size", value)?;
        if size.iter().any(|v| v.abs() > f32::MAX as f64) {
            return Err(StrataError::invalid("size", "values exceed f32 range"));
        }
        Ok(size)
    }

    /// Grid resolution (`faces: [cols, rows]`)
    pub fn faces(&self) -> Result<[u32; 2]> {
        let value = self
            .0
            .get("faces")
            .ok_or_else(|| StrataError::missing("faces"))?;
        let [cols, rows] = number_pair("faces", value)?;
        if cols < 1.0 || rows < 1.0 || cols.fract() != 0.0 || rows.fract() != 0.0 {
            return Err(StrataError::invalid("faces", "expected two positive integers"));
        }
        if (cols + 1.0) * (rows + 1.0) > MAX_VERTICES as f64 {
            return Err(StrataError::invalid(
                "faces",
                format!("grid exceeds {} vertices", MAX_VERTICES),
            ));
        }
        Ok([cols as u32, rows as u32])
    }

    /// The lights block; required even if every light field is defaulted
    pub fn lights(&self) -> Result<&Map<String, Value>> {
        self.0
            .get("lights")
            .ok_or_else(|| StrataError::missing("lights"))?
            .as_object()
            .ok_or_else(|| StrataError::invalid("lights", "expected an object"))
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Colour pair at `key`, falling back to white on white
    pub fn color_pair_or_default(&self, key: &str) -> [String; 2] {
        color_pair(self.0.get(key))
    }
}

/// Read a `[a, b]` colour pair leniently
pub(crate) fn color_pair(value: Option<&Value>) -> [String; 2] {
    let pick = |index: usize| {
        value
            .and_then(|v| v.get(index))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_COLORS[index])
            .to_string()
    };
    [pick(0), pick(1)]
}

fn number_pair(field: &str, value: &Value) -> Result<[f64; 2]> {
    let items = value
        .as_array()
        .ok_or_else(|| StrataError::invalid(field, "expected a two element array"))?;
    if items.len() != 2 {
        return Err(StrataError::invalid(
            field,
            format!("expected 2 elements, found {}", items.len()),
        ));
    }
    let read = |index: usize| {
        items[index]
            .as_f64()
            .ok_or_else(|| StrataError::invalid(field, "expected numbers"))
    };
    Ok([read(0)?, read(1)?])
}
