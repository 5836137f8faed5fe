//! Strata - Layer Stack State Capture
//!
//! Strata keeps a stack of visual layers (procedural mirrored surfaces and
//! vector overlays) and captures the whole visual state into a portable
//! snapshot that rebuilds into an identical live scene.
//!
//! # Architecture
//!
//! - `scene`: deterministic scene builder and the scene cache
//! - `layers`: layer configs and the ordered layer registry
//! - `state`: snapshot schema, export, import and archive packaging
//! - `bridge`: message boundary to the render/UI side
//! - `session`: owns registry + cache and dispatches bridge events

pub mod bridge;
pub mod cli;
pub mod error;
pub mod layers;
pub mod scene;
pub mod session;
pub mod settings;
pub mod state;

pub use error::{Result, StrataError};
pub use session::Session;
pub use settings::Settings;
