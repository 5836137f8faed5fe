//! Scene Builder
//!
//! Turns a layer config into a mirrored flat-surface scene: a jittered grid
//! of `(cols + 1) x (rows + 1)` vertices spanning `size`, two triangles per
//! cell, plus a ring of lights.
//!
//! Without a fuzz the jitter comes from a PRNG seeded with a SHA-256 digest
//! of the config, so the same config always yields the same surface. With a
//! fuzz, every vertex attribute is taken from it verbatim.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use super::mesh::{Geometry, Light, Material, Mesh, Scene, SceneFuzz, Vertex};
use crate::error::{Result, StrataError};
use crate::layers::{color_pair, LayerConfig};

const DEFAULT_X_RANGE: f64 = 0.8;
const DEFAULT_Y_RANGE: f64 = 0.1;
const DEFAULT_MIRROR: f64 = 0.5;
const DEFAULT_LIGHT_COUNT: u64 = 2;
const DEFAULT_LIGHT_SPEED: f64 = 400.0;
const MAX_LIGHTS: u64 = 256;

/// Depth jitter relative to the smaller cell side
const DEPTH_JITTER: f64 = 0.1;
/// Noise added on top of the mirrored gradient
const GRADIENT_NOISE: f64 = 0.05;

/// Build the scene for `config`, reusing `fuzz` when given
///
/// Fails with `MissingField` / `InvalidField` when `size`, `faces` or
/// `lights` are absent or malformed, and with `FuzzMismatch` when the fuzz
/// does not cover the grid exactly.
pub fn build(config: &LayerConfig, fuzz: Option<&SceneFuzz>) -> Result<Scene> {
    let [width, height] = config.size()?;
    let [cols, rows] = config.faces()?;
    let lights = build_lights(config, width, height)?;

    let vertices = match fuzz {
        Some(fuzz) => {
            let expected = vertex_count(cols, rows);
            if fuzz.len() != expected {
                return Err(StrataError::FuzzMismatch {
                    expected,
                    actual: fuzz.len(),
                });
            }
            fuzz.iter().map(Vertex::from_fuzz).collect()
        }
        None => generate_vertices(config, width, height, cols, rows)?,
    };

    let [ambient, diffuse] = config.color_pair_or_default("material");
    let mesh = Mesh {
        geometry: Geometry {
            vertices,
            triangles: triangulate(cols, rows),
        },
        material: Material { ambient, diffuse },
    };

    Ok(Scene {
        meshes: vec![mesh],
        lights,
    })
}

fn vertex_count(cols: u32, rows: u32) -> usize {
    (cols as usize + 1) * (rows as usize + 1)
}

/// Seed derived from the config's canonical JSON (keys are sorted)
fn seed_for(config: &LayerConfig) -> Result<[u8; 32]> {
    let bytes = serde_json::to_vec(config.as_value())?;
    let digest = Sha256::digest(&bytes);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    Ok(seed)
}

fn generate_vertices(
    config: &LayerConfig,
    width: f64,
    height: f64,
    cols: u32,
    rows: u32,
) -> Result<Vec<Vertex>> {
    let mut rng = StdRng::from_seed(seed_for(config)?);

    let x_range = config.number_or("xRange", DEFAULT_X_RANGE);
    let y_range = config.number_or("yRange", DEFAULT_Y_RANGE);
    let mirror = config.number_or("mirror", DEFAULT_MIRROR);

    let cell_w = width / cols as f64;
    let cell_h = height / rows as f64;
    let depth = cell_w.min(cell_h) * DEPTH_JITTER;

    let mut vertices = Vec::with_capacity(vertex_count(cols, rows));
    for row in 0..=rows {
        for col in 0..=cols {
            let ax = -width / 2.0 + col as f64 * cell_w;
            let ay = -height / 2.0 + row as f64 * cell_h;

            let dx = rng.gen_range(-1.0..=1.0) * x_range * cell_w * 0.5;
            let dy = rng.gen_range(-1.0..=1.0) * y_range * cell_h * 0.5;
            let dz = rng.gen_range(-1.0..=1.0) * depth;

            // brightest on the mirror axis, fading towards the edges
            let u = col as f64 / cols as f64;
            let gradient = (1.0 - (u - mirror).abs() * 2.0
                + rng.gen_range(-GRADIENT_NOISE..=GRADIENT_NOISE))
            .clamp(0.0, 1.0);

            let v0 = [
                coordinate("xRange", ax + dx)?,
                coordinate("yRange", ay + dy)?,
                dz as f32,
            ];
            vertices.push(Vertex {
                position: v0,
                v0,
                time: rng.gen::<f32>(),
                anchor: [ax as f32, ay as f32, 0.0],
                gradient: gradient as f32,
            });
        }
    }
    Ok(vertices)
}

/// Narrow to `f32`, rejecting values that would serialize as `null`
fn coordinate(field: &str, value: f64) -> Result<f32> {
    let narrowed = value as f32;
    if narrowed.is_finite() {
        Ok(narrowed)
    } else {
        Err(StrataError::invalid(field, "vertex offset exceeds f32 range"))
    }
}

fn triangulate(cols: u32, rows: u32) -> Vec<[u32; 3]> {
    let stride = cols + 1;
    let mut triangles = Vec::with_capacity(cols as usize * rows as usize * 2);
    for row in 0..rows {
        for col in 0..cols {
            let a = row * stride + col;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }
    triangles
}

fn build_lights(config: &LayerConfig, width: f64, height: f64) -> Result<Vec<Light>> {
    let lights = config.lights()?;

    let count = match lights.get("count") {
        None => DEFAULT_LIGHT_COUNT,
        Some(value) => value
            .as_u64()
            .ok_or_else(|| StrataError::invalid("lights.count", "expected a whole number"))?,
    };
    if count > MAX_LIGHTS {
        return Err(StrataError::invalid(
            "lights.count",
            format!("at most {} lights", MAX_LIGHTS),
        ));
    }
    let speed = lights
        .get("speed")
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_LIGHT_SPEED);
    if speed.abs() > f32::MAX as f64 {
        return Err(StrataError::invalid("lights.speed", "exceeds f32 range"));
    }
    let ambient = color_pair(lights.get("ambient"))[1].clone();
    let diffuse = color_pair(lights.get("diffuse"))[1].clone();

    let radius = width.max(height) / 2.0;
    Ok((0..count)
        .map(|i| {
            let angle = i as f64 / count as f64 * TAU;
            Light {
                ambient: ambient.clone(),
                diffuse: diffuse.clone(),
                position: [
                    (angle.cos() * radius) as f32,
                    (angle.sin() * radius) as f32,
                    radius as f32,
                ],
                speed: speed as f32,
            }
        })
        .collect())
}
