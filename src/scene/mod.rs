//! Scene Module
//!
//! Procedural surface scenes and the cache that holds them.

mod builder;
mod cache;
mod mesh;

pub use builder::build;
pub use cache::SceneCache;
pub use mesh::{FuzzVertex, Geometry, Light, Material, Mesh, Scene, SceneFuzz, Vertex};
