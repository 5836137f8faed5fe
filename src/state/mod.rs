//! State Capture Module
//!
//! Snapshot schema, export, import, player assets and archive packaging.

pub mod archive;
pub mod assets;
pub mod export;
pub mod import;
pub mod snapshot;

pub use archive::{package, scene_script, ExportGate, ExportPermit};
pub use assets::{AssetSource, DirAssetSource};
#[cfg(feature = "http-assets")]
pub use assets::HttpAssetSource;
pub use export::{export_state, fill_snapshot};
pub use import::{prepare_import, PreparedImport};
pub use snapshot::{blends_fragment, ExportedLayer, ExportedState, ImportWire, WireLayer};
