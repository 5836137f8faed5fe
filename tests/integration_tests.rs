//! Integration Tests
//!
//! End-to-end snapshot capture and reconstruction through a `Session`.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use strata::bridge::{BridgeCommand, BridgeEvent, RecordingBridge};
use strata::layers::{BlendMode, Layer, LayerConfig, LayerKind};
use strata::state::ExportedState;
use strata::{Session, Settings};

fn mirror_config(ambient: &str) -> LayerConfig {
    LayerConfig::from(json!({
        "size": [100, 100],
        "faces": [10, 10],
        "lights": {
            "ambient": ["#000000", ambient],
            "diffuse": ["#000000", "#e4fde1"],
            "speed": 400,
            "count": 2
        },
        "material": ["#ffffff", "#ffffff"],
        "mirror": 0.5
    }))
}

fn new_session() -> Session<RecordingBridge> {
    Session::new(RecordingBridge::new(), Settings::default()).unwrap()
}

fn scenario_session() -> Session<RecordingBridge> {
    let mut session = new_session().with_layers(vec![
        Layer::mirror(mirror_config("#f45b69")).with_blend(BlendMode::from("add")),
        Layer::svg().with_blend(BlendMode::from("normal")),
    ]);
    session.rebuild_all().unwrap();
    session
}

fn export(session: &mut Session<RecordingBridge>) -> String {
    let partial = serde_json::to_string(&session.current_state()).unwrap();
    session.export_state(&partial).unwrap()
}

// === Round Trip Tests ===

#[test]
fn test_export_then_import_two_layer_scenario() {
    let mut source = scenario_session();
    let snapshot = export(&mut source);

    let mut target = new_session();
    target.import(&snapshot).unwrap();

    let registry = target.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(0).unwrap().kind, LayerKind::FssMirror);
    assert_eq!(registry.get(1).unwrap().kind, LayerKind::Svg);

    let state: ExportedState = serde_json::from_str(&snapshot).unwrap();
    assert!(state.layers[1].scene_fuzz.is_none());
    assert!(state.layers[0].scene_fuzz.is_some());
}

#[test]
fn test_round_trip_restores_configs_and_vertices() {
    let mut source = scenario_session();
    let snapshot = export(&mut source);
    let state: ExportedState = serde_json::from_str(&snapshot).unwrap();

    let mut target = new_session();
    target.import(&snapshot).unwrap();

    for (index, layer) in state.layers.iter().enumerate() {
        let imported = target.registry().get(index).unwrap();
        assert_eq!(imported.kind, layer.kind);
        assert_eq!(imported.config, layer.config);

        if let Some(fuzz) = &layer.scene_fuzz {
            let scene = target.cache().get(index).unwrap();
            assert_eq!(&scene.flatten(), fuzz);
        }
    }

    // and the rebuilt scene is the one that was exported
    assert_eq!(target.cache().get(0), source.cache().get(0));
}

#[test]
fn test_reexport_is_stable() {
    let mut source = scenario_session();
    let first = export(&mut source);

    let mut target = new_session();
    target.import(&first).unwrap();
    let second = export(&mut target);

    assert_eq!(first, second);
}

#[test]
fn test_imported_fuzz_wins_over_generation() {
    let mut source = scenario_session();
    let snapshot = export(&mut source);

    // hand-edit one vertex in the text format
    let mut value: Value = serde_json::from_str(&snapshot).unwrap();
    value["layers"][0]["sceneFuzz"][5]["time"] = json!(0.5);
    value["layers"][0]["sceneFuzz"][5]["v0"] = json!([1.0, 2.0, 3.0]);

    let mut target = new_session();
    target.import(&value.to_string()).unwrap();

    let vertex = &target.cache().get(0).unwrap().meshes[0].geometry.vertices[5];
    assert_eq!(vertex.time, 0.5);
    assert_eq!(vertex.v0, [1.0, 2.0, 3.0]);
}

#[test]
fn test_fuzz_present_iff_mirror() {
    let mut session = new_session().with_layers(vec![
        Layer::svg(),
        Layer::mirror(mirror_config("#111111")),
        Layer::new(LayerKind::from("text"), LayerConfig::empty()),
        Layer::mirror(mirror_config("#222222")),
    ]);
    let state: ExportedState = serde_json::from_str(&export(&mut session)).unwrap();

    for layer in &state.layers {
        assert_eq!(layer.scene_fuzz.is_some(), layer.kind == LayerKind::FssMirror);
    }
    assert_eq!(state.layers[2].kind.as_str(), "text");
}

// === Import Publishing Tests ===

#[test]
fn test_import_publishes_types_before_geometry() {
    let mut source = scenario_session();
    let snapshot = export(&mut source);

    let mut target = new_session();
    target.import(&snapshot).unwrap();

    let commands = target.bridge().commands();
    assert_eq!(commands[0], BridgeCommand::Pause);
    assert_eq!(
        commands[1],
        BridgeCommand::InitLayers(vec![LayerKind::FssMirror, LayerKind::Svg])
    );
    match &commands[2] {
        BridgeCommand::Import(wire) => {
            let wire: Value = serde_json::from_str(wire).unwrap();
            assert_eq!(wire["layers"][0]["config"], json!(""));
            assert_eq!(wire["layers"][1]["type_"], json!("svg"));
        }
        other => panic!("Expected Import, got {:?}", other),
    }
    assert!(matches!(
        commands[3],
        BridgeCommand::ConfigureMirroredFss { index: 0, .. }
    ));
    assert!(matches!(commands[4], BridgeCommand::RebuildFss { index: 0, .. }));
    assert_eq!(
        commands.last(),
        Some(&BridgeCommand::SetFragment("#blends=add:normal".to_string()))
    );
    assert_eq!(target.fragment(), Some("#blends=add:normal"));
}

#[test_case("{not json" ; "malformed json")]
#[test_case(r#"{"layers": [{"type": "fss-mirror", "config": {"faces": [2, 2]}}]}"# ; "missing size")]
#[test_case(r#"{"layers": [{"type": "fss-mirror", "config": {"size": [1, 1], "faces": [1, 1], "lights": {}}, "sceneFuzz": []}]}"# ; "short fuzz")]
#[test_case(r#"{"layers": [{"type": "fss-mirror", "config": {"size": [1, 1], "faces": [1000000, 1000000], "lights": {}}}]}"# ; "oversized grid")]
#[test_case(r#"{"layers": [{"type": "fss-mirror", "config": {"size": [1e39, 1e39], "faces": [1, 1], "lights": {}}}]}"# ; "size beyond f32")]
fn test_failed_import_leaves_state_unchanged(text: &str) {
    let mut session = scenario_session();
    let registry_before = session.registry().clone();
    let cache_before = session.cache().clone();
    session.bridge_mut().take();

    session.handle_event(BridgeEvent::Import(text.to_string()));

    assert_eq!(session.registry(), &registry_before);
    assert_eq!(session.cache(), &cache_before);
    assert_eq!(
        session.bridge().notifications(),
        vec!["Failed to parse or send, incorrect format?"]
    );
}

#[test]
fn test_malformed_import_is_parse_error() {
    let mut session = scenario_session();
    let err = session.import("{not json").unwrap_err();
    assert_eq!(err.error_code(), "PARSE_ERROR");
}

// === Edit Tests ===

#[test]
fn test_update_all_updates_each_mirror_independently() {
    let mut session = new_session().with_layers(vec![
        Layer::mirror(mirror_config("#f45b69")),
        Layer::mirror(mirror_config("#4b4e76")),
    ]);
    session.rebuild_all().unwrap();
    let diffuse_before: Vec<Value> = session
        .registry()
        .iter()
        .map(|layer| layer.config.as_value()["lights"]["diffuse"].clone())
        .collect();

    let updated = session
        .update_all(|mut cfg| {
            cfg.as_value_mut()["lights"]["ambient"][1] = json!("#ffffff");
            cfg
        })
        .unwrap();

    assert_eq!(updated, vec![0, 1]);
    for (index, layer) in session.registry().iter().enumerate() {
        let lights = &layer.config.as_value()["lights"];
        assert_eq!(lights["ambient"], json!(["#000000", "#ffffff"]));
        assert_eq!(lights["diffuse"], diffuse_before[index]);

        let scene = session.cache().get(index).unwrap();
        assert_eq!(scene.lights[0].ambient, "#ffffff");
    }
}

#[test]
fn test_rebuild_all_twice_is_byte_identical() {
    let mut session = scenario_session();
    let first = serde_json::to_vec(&session.cache().get(0).unwrap()).unwrap();
    session.rebuild_all().unwrap();
    let second = serde_json::to_vec(&session.cache().get(0).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test_case(1280.0, 720.0 ; "landscape")]
#[test_case(333.3, 999.9 ; "fractional")]
fn test_resize_sets_mirror_size(width: f64, height: f64) {
    let mut session = scenario_session();
    let svg_before = session.registry().get(1).unwrap().clone();

    session.resize(width, height).unwrap();

    let size = session.registry().get(0).unwrap().config.size().unwrap();
    assert_eq!(size, [(width * 2.5).floor(), (height * 2.5).floor()]);
    assert_eq!(session.registry().get(1).unwrap(), &svg_before);
}

#[test]
fn test_update_colors_event() {
    let mut session = scenario_session();
    session.handle_event(BridgeEvent::UpdateColors {
        index: 0,
        colors: ["#101010".to_string(), "#202020".to_string()],
    });

    let scene = session.cache().get(0).unwrap();
    assert_eq!(scene.lights[0].ambient, "#101010");
    assert_eq!(scene.lights[0].diffuse, "#202020");
    assert!(session.bridge().notifications().is_empty());
}

// === Failed Edit Tests ===

fn assert_round_trips(session: &mut Session<RecordingBridge>) {
    let snapshot = export(session);
    let mut target = new_session();
    target.import(&snapshot).unwrap();
    assert_eq!(target.registry(), session.registry());
}

#[test]
fn test_failed_update_all_changes_nothing() {
    let mut session = new_session().with_layers(vec![
        Layer::mirror(mirror_config("#f45b69")),
        Layer::mirror(mirror_config("#4b4e76")),
    ]);
    session.rebuild_all().unwrap();
    let registry_before = session.registry().clone();
    let cache_before = session.cache().clone();
    session.bridge_mut().take();

    // shrink both grids, but break the second layer's lights
    let mut seen = 0;
    let err = session
        .update_all(|mut cfg| {
            cfg.set("faces", json!([4, 4]));
            if seen == 1 {
                cfg.as_value_mut().as_object_mut().unwrap().remove("lights");
            }
            seen += 1;
            cfg
        })
        .unwrap_err();

    assert_eq!(err.error_code(), "MISSING_FIELD");
    assert_eq!(session.registry(), &registry_before);
    assert_eq!(session.cache(), &cache_before);
    assert!(session.bridge().commands().is_empty());
    assert_round_trips(&mut session);
}

#[test]
fn test_failed_start_gui_keeps_previous_sizes() {
    let mut broken = mirror_config("#4b4e76");
    broken.as_value_mut().as_object_mut().unwrap().remove("lights");
    let mut session = new_session().with_layers(vec![
        Layer::mirror(mirror_config("#f45b69")),
        Layer::mirror(broken),
    ]);
    let registry_before = session.registry().clone();

    session.handle_event(BridgeEvent::Viewport {
        width: 400.0,
        height: 300.0,
    });
    session.handle_event(BridgeEvent::StartGui(Default::default()));

    assert_eq!(session.registry(), &registry_before);
    assert!(session.cache().is_empty());
    assert_eq!(
        session.bridge().notifications(),
        vec!["Failed to parse or send, incorrect format?"]
    );
}

#[test]
fn test_out_of_range_update_keeps_snapshot_importable() {
    let mut session = scenario_session();

    let mut huge = mirror_config("#f45b69");
    huge.set("size", json!([1e39, 1e39]));
    session.handle_event(BridgeEvent::UpdateLayer {
        index: 0,
        config: huge,
    });

    assert_eq!(
        session.bridge().notifications(),
        vec!["Failed to parse or send, incorrect format?"]
    );
    assert_eq!(
        session.registry().get(0).unwrap().config,
        mirror_config("#f45b69")
    );
    assert_round_trips(&mut session);
}
