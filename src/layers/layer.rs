//! Layer - a single entry in the stack
//!
//! A layer pairs a kind with its configuration and blend mode. Only
//! mirrored surface layers carry geometry; every other kind is passed
//! through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LayerConfig;

/// Wire name of the mirrored flat-surface layer kind
pub const FSS_MIRROR: &str = "fss-mirror";
/// Wire name of the vector overlay layer kind
pub const SVG: &str = "svg";

/// What a layer renders
///
/// Unknown kinds are kept verbatim so a snapshot from a newer player
/// survives a round trip through this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    FssMirror,
    Svg,
    Other(String),
}

impl LayerKind {
    pub fn as_str(&self) -> &str {
        match self {
            LayerKind::FssMirror => FSS_MIRROR,
            LayerKind::Svg => SVG,
            LayerKind::Other(name) => name,
        }
    }

    /// Whether layers of this kind own a generated mesh
    pub fn has_geometry(&self) -> bool {
        matches!(self, LayerKind::FssMirror)
    }
}

impl From<String> for LayerKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            FSS_MIRROR => LayerKind::FssMirror,
            SVG => LayerKind::Svg,
            _ => LayerKind::Other(name),
        }
    }
}

impl From<&str> for LayerKind {
    fn from(name: &str) -> Self {
        LayerKind::from(name.to_string())
    }
}

impl From<LayerKind> for String {
    fn from(kind: LayerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blend mode as supplied by the render side
///
/// The core never interprets it; it only needs a stable text form for the
/// shareable `#blends=` fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlendMode(Value);

impl BlendMode {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Strings are used as-is, anything else as compact JSON
    pub fn encoded(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for BlendMode {
    fn from(blend: &str) -> Self {
        Self(Value::String(blend.to_string()))
    }
}

/// One entry of the layer registry
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub config: LayerConfig,
    pub blend: BlendMode,
}

impl Layer {
    pub fn new(kind: LayerKind, config: LayerConfig) -> Self {
        Self {
            kind,
            config,
            blend: BlendMode::default(),
        }
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn mirror(config: LayerConfig) -> Self {
        Self::new(LayerKind::FssMirror, config)
    }

    pub fn svg() -> Self {
        Self::new(LayerKind::Svg, LayerConfig::empty())
    }

    pub fn is_mirror(&self) -> bool {
        self.kind.has_geometry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("fss-mirror", LayerKind::FssMirror ; "mirror")]
    #[test_case("svg", LayerKind::Svg ; "svg")]
    #[test_case("text", LayerKind::Other("text".to_string()) ; "unknown kind")]
    fn test_kind_from_wire_name(name: &str, expected: LayerKind) {
        let kind: LayerKind = serde_json::from_value(json!(name)).unwrap();
        assert_eq!(kind, expected);
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!(name));
    }

    #[test_case(json!("add"), "add" ; "string blend")]
    #[test_case(json!({ "color": [0, 1] }), r#"{"color":[0,1]}"# ; "object blend")]
    #[test_case(Value::Null, "" ; "missing blend")]
    fn test_blend_encoding(value: Value, expected: &str) {
        assert_eq!(BlendMode::new(value).encoded(), expected);
    }

    #[test]
    fn test_only_mirror_has_geometry() {
        assert!(Layer::mirror(LayerConfig::default_mirror()).is_mirror());
        assert!(!Layer::svg().is_mirror());
        assert!(!LayerKind::from("text").has_geometry());
    }
}
