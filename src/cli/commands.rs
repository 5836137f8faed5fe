//! CLI Command Implementations
//!
//! Each command drives a `Session` with a recording bridge, the same way a
//! render host would, and writes the result to disk or stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::bridge::RecordingBridge;
use crate::layers::Layer;
use crate::session::Session;
use crate::settings::Settings;
use crate::state::DirAssetSource;

fn open_session(settings: &Settings) -> Result<Session<RecordingBridge>> {
    Session::new(RecordingBridge::new(), settings.clone()).context("failed to start session")
}

fn load_snapshot(settings: &Settings, path: &Path) -> Result<Session<RecordingBridge>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let mut session = open_session(settings)?;
    session
        .import(&text)
        .with_context(|| format!("failed to import {}", path.display()))?;
    Ok(session)
}

fn export_current(session: &mut Session<RecordingBridge>) -> Result<String> {
    let partial = serde_json::to_string(&session.current_state())?;
    Ok(session.export_state(&partial)?)
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

/// Build a snapshot from scratch.
pub fn new_snapshot(
    settings: &Settings,
    mirrors: usize,
    svg: usize,
    output: Option<&Path>,
) -> Result<()> {
    info!("Creating snapshot with {} mirror and {} svg layers", mirrors, svg);

    let layers = (0..mirrors)
        .map(|_| Layer::mirror(settings.default_layer.clone()))
        .chain((0..svg).map(|_| Layer::svg()))
        .collect();
    let mut session = open_session(settings)?.with_layers(layers);

    let [width, height] = settings.viewport;
    session.resize(width, height)?;

    let snapshot = export_current(&mut session)?;
    write_output(output, &snapshot)
}

/// Import a snapshot and print what it contains.
pub fn inspect(settings: &Settings, path: &Path) -> Result<()> {
    info!("Inspecting snapshot: {}", path.display());

    let session = load_snapshot(settings, path)?;

    println!("Snapshot: {}", path.display());
    println!("{:-<60}", "");
    for (index, layer) in session.registry().iter().enumerate() {
        let vertices = session
            .cache()
            .get(index)
            .map(|scene| scene.vertex_count())
            .unwrap_or(0);
        println!(
            "{:>3}: {:<12} blend={:<12} vertices={}",
            index,
            layer.kind,
            layer.blend.encoded(),
            vertices
        );
    }
    println!("{:-<60}", "");
    if let Some(fragment) = session.fragment() {
        println!("Fragment: {}", fragment);
    }

    Ok(())
}

/// Round-trip a snapshot, resizing mirror layers first when asked.
pub fn rebuild(
    settings: &Settings,
    path: &Path,
    viewport: Option<(f64, f64)>,
    output: Option<&Path>,
) -> Result<()> {
    info!("Rebuilding snapshot: {}", path.display());

    let mut session = load_snapshot(settings, path)?;
    if let Some((width, height)) = viewport {
        session.resize(width, height)?;
    }

    let snapshot = export_current(&mut session)?;
    write_output(output, &snapshot)
}

/// Bundle a snapshot with the player into a zip.
pub fn package(
    settings: &Settings,
    path: &Path,
    assets: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    info!("Packaging snapshot: {}", path.display());

    let mut session = load_snapshot(settings, path)?;
    if let Some(dir) = assets {
        session = session.with_assets(Box::new(DirAssetSource::new(dir)));
    }

    let partial = serde_json::to_string(&session.current_state())?;
    let archive = session.export_archive(&partial)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&settings.archive_name));
    fs::write(&output, &archive)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes)", output.display(), archive.len());

    Ok(())
}
