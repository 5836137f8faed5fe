//! Layer Model Module
//!
//! The layer stack and its registry:
//! - `LayerConfig`: opaque, deep-copied configuration tree
//! - `Layer`: kind + config + blend
//! - `LayerRegistry`: ordered list, index is identity

mod config;
mod layer;
mod registry;

pub use config::{LayerConfig, MAX_VERTICES};
pub use layer::{BlendMode, Layer, LayerKind, FSS_MIRROR, SVG};
pub use registry::{LayerRegistry, DEFAULT_RESIZE_FACTOR};

pub(crate) use config::color_pair;
