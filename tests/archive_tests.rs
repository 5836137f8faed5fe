//! Archive export tests: player assets from disk, zip layout, export gate.

use std::fs;
use std::io::{Cursor, Read};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use zip::ZipArchive;

use strata::bridge::{BridgeCommand, BridgeEvent, RecordingBridge};
use strata::layers::{Layer, LayerConfig};
use strata::state::{DirAssetSource, ExportedState};
use strata::{Session, Settings, StrataError};

const BUNDLE: &str = "console.log('player');";
const HTML: &str = "<html><script src=\"scene.js\"></script></html>";

fn asset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("player.bundle.js"), BUNDLE).unwrap();
    fs::write(dir.path().join("index.player.html"), HTML).unwrap();
    dir
}

fn session_with_assets(dir: &TempDir) -> Session<RecordingBridge> {
    let config = LayerConfig::from(json!({
        "size": [60, 40],
        "faces": [3, 2],
        "lights": { "ambient": ["#000000", "#f45b69"], "diffuse": ["#000000", "#e4fde1"] }
    }));
    Session::new(RecordingBridge::new(), Settings::default())
        .unwrap()
        .with_assets(Box::new(DirAssetSource::new(dir.path())))
        .with_layers(vec![Layer::mirror(config), Layer::svg()])
}

fn partial(session: &Session<RecordingBridge>) -> String {
    serde_json::to_string(&session.current_state()).unwrap()
}

fn read_entry(archive: &[u8], name: &str) -> String {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut contents = String::new();
    zip.by_name(name)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

#[test]
fn test_archive_contains_player_and_scene() {
    let dir = asset_dir();
    let mut session = session_with_assets(&dir);
    let current = partial(&session);

    let archive = session.export_archive(&current).unwrap();

    assert_eq!(read_entry(&archive, "player.bundle.js"), BUNDLE);
    assert_eq!(read_entry(&archive, "index.html"), HTML);

    let script = read_entry(&archive, "scene.js");
    let json = script
        .strip_prefix("window.jsGenScene = ")
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap();
    let state: ExportedState = serde_json::from_str(json).unwrap();
    assert_eq!(state.layers.len(), 2);
    assert_eq!(state.layers[0].scene_fuzz.as_ref().unwrap().len(), 12);
    assert!(state.layers[1].scene_fuzz.is_none());

    assert!(!session.export_gate().is_busy());
}

#[test]
fn test_custom_global_name() {
    let dir = asset_dir();
    let settings = Settings {
        global_name: "myScene".to_string(),
        ..Settings::default()
    };
    let mut session = Session::new(RecordingBridge::new(), settings)
        .unwrap()
        .with_assets(Box::new(DirAssetSource::new(dir.path())));
    let current = partial(&session);

    let archive = session.export_archive(&current).unwrap();
    assert!(read_entry(&archive, "scene.js").starts_with("window.myScene = "));
}

#[test]
fn test_missing_asset_aborts_before_export() {
    let dir = asset_dir();
    fs::remove_file(dir.path().join("index.player.html")).unwrap();
    let mut session = session_with_assets(&dir);
    let registry_before = session.registry().clone();
    let current = partial(&session);

    let err = session.export_archive(&current).unwrap_err();

    assert!(matches!(err, StrataError::AssetFetch { ref asset, .. } if asset == "index.player.html"));
    assert_eq!(session.registry(), &registry_before);
    // no pause either: state was never read
    assert!(session.bridge().commands().is_empty());
    assert!(!session.export_gate().is_busy());
}

#[test]
fn test_second_export_rejected_while_busy() {
    let dir = asset_dir();
    let mut session = session_with_assets(&dir);
    let current = partial(&session);

    let gate = session.export_gate();
    let permit = gate.try_acquire().unwrap();

    let err = session.export_archive(&current).unwrap_err();
    assert!(matches!(err, StrataError::ExportInProgress));

    drop(permit);
    assert!(session.export_archive(&current).is_ok());
}

#[test]
fn test_export_zip_event_saves_archive() {
    let dir = asset_dir();
    let mut session = session_with_assets(&dir);
    let current = partial(&session);

    session.handle_event(BridgeEvent::ExportZip(current));

    match session.bridge().commands().last() {
        Some(BridgeCommand::SaveArchive { file_name, bytes }) => {
            assert_eq!(file_name, "export.zip");
            assert_eq!(read_entry(bytes, "player.bundle.js"), BUNDLE);
        }
        other => panic!("Expected SaveArchive, got {:?}", other),
    }
}

#[test]
fn test_export_zip_event_failure_notifies() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_assets(&dir);
    let current = partial(&session);

    session.handle_event(BridgeEvent::ExportZip(current));

    assert_eq!(
        session.bridge().notifications(),
        vec!["Failed to create .zip"]
    );
}
