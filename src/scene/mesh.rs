//! Scene graph types
//!
//! Scenes are derived data: always reproducible from a layer config plus an
//! optional fuzz, never edited by hand.

use serde::{Deserialize, Serialize};

/// A single surface vertex with its animation attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Current position; equals `v0` straight after a build
    pub position: [f32; 3],
    /// Base position the animation oscillates around
    pub v0: [f32; 3],
    /// Animation phase
    pub time: f32,
    /// Grid point the vertex is constrained to
    pub anchor: [f32; 3],
    /// Shading parameter
    pub gradient: f32,
}

impl Vertex {
    pub fn from_fuzz(fuzz: &FuzzVertex) -> Self {
        Self {
            position: fuzz.v0,
            v0: fuzz.v0,
            time: fuzz.time,
            anchor: fuzz.anchor,
            gradient: fuzz.gradient,
        }
    }

    pub fn fuzz(&self) -> FuzzVertex {
        FuzzVertex {
            v0: self.v0,
            time: self.time,
            anchor: self.anchor,
            gradient: self.gradient,
        }
    }
}

/// Exported subset of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzVertex {
    pub v0: [f32; 3],
    pub time: f32,
    pub anchor: [f32; 3],
    pub gradient: f32,
}

/// Per-vertex attributes of a scene's first mesh
///
/// Stands in for the random seed: a rebuild with the same fuzz gives the
/// same surface no matter how the original was generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneFuzz(pub Vec<FuzzVertex>);

impl SceneFuzz {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuzzVertex> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    /// Vertex indices, counter-clockwise
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ambient: String,
    pub diffuse: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub ambient: String,
    pub diffuse: String,
    pub position: [f32; 3],
    pub speed: f32,
}

/// A renderable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
}

impl Scene {
    /// Fuzz of the first mesh; empty for a scene without meshes
    pub fn flatten(&self) -> SceneFuzz {
        SceneFuzz(
            self.meshes
                .first()
                .map(|mesh| mesh.geometry.vertices.iter().map(Vertex::fuzz).collect())
                .unwrap_or_default(),
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes
            .iter()
            .map(|mesh| mesh.geometry.vertices.len())
            .sum()
    }
}
