//! Session
//!
//! Owns the layer registry, the scene cache and the bridge to the render
//! side, and is the only place either structure is mutated. Lifecycle:
//! - init: `Session::new` plus optional `with_layers`
//! - update-on-edit: `update_layer`, `update_all`, `update_colors`, `resize`
//! - replace-on-import: `import`
//!
//! User-triggered actions arriving through `handle_event` never fail the
//! session; errors are logged and shown to the user as a `Notify` command.

use log::{debug, error, info};
use rayon::prelude::*;

use crate::bridge::{BridgeCommand, BridgeEvent, RenderBridge};
use crate::error::{Result, StrataError};
use crate::layers::{BlendMode, Layer, LayerConfig, LayerRegistry};
use crate::scene::{self, Scene, SceneCache};
use crate::settings::Settings;
use crate::state::{
    self, blends_fragment, prepare_import, AssetSource, ExportGate, ExportedState,
    PreparedImport,
};

/// Message shown when an import is requested with no text
pub const NOTHING_TO_IMPORT: &str = "Nothing to import";

/// One editing session: the layer stack, its scenes and the render bridge
pub struct Session<B: RenderBridge> {
    registry: LayerRegistry,
    cache: SceneCache,
    bridge: B,
    settings: Settings,
    assets: Box<dyn AssetSource>,
    export_gate: ExportGate,
    /// Camera and clock parameters from the last import
    globals: ExportedState,
    viewport: [f64; 2],
    fragment: Option<String>,
}

impl<B: RenderBridge> Session<B> {
    /// Create an empty session; assets come from `settings`
    pub fn new(bridge: B, settings: Settings) -> Result<Self> {
        let assets = settings.asset_source()?;
        let viewport = settings.viewport;
        Ok(Self {
            registry: LayerRegistry::new(),
            cache: SceneCache::new(),
            bridge,
            settings,
            assets,
            export_gate: ExportGate::new(),
            globals: ExportedState::default(),
            viewport,
            fragment: None,
        })
    }

    pub fn with_assets(mut self, assets: Box<dyn AssetSource>) -> Self {
        self.assets = assets;
        self
    }

    /// Seed the registry; scenes are built on the next rebuild
    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.registry = LayerRegistry::from_layers(layers);
        self.cache.clear();
        self
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &SceneCache {
        &self.cache
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shareable `#blends=...` fragment, once one has been published
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Handle for the archive export's exclusive section
    pub fn export_gate(&self) -> ExportGate {
        self.export_gate.clone()
    }

    pub fn viewport(&self) -> [f64; 2] {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = [width, height];
    }

    /// Rebuild layer `index` from `config`, publish it and store both
    ///
    /// A build failure leaves everything untouched. A stale index still
    /// publishes and caches the scene but the registry ignores it.
    pub fn update_layer(&mut self, index: usize, config: LayerConfig) -> Result<()> {
        let scene = scene::build(&config, None)?;
        self.bridge.send(BridgeCommand::ConfigureMirroredFss {
            config: config.clone(),
            index,
        });
        self.bridge.send(BridgeCommand::RebuildFss {
            scene: scene.clone(),
            index,
        });
        self.registry.update_layer(index, config);
        self.cache.insert(index, scene);
        Ok(())
    }

    /// Apply `transform` to a copy of every mirror config and rebuild
    ///
    /// All or nothing: if any transformed config fails to build, the
    /// registry and cache keep their previous contents.
    pub fn update_all<F>(&mut self, transform: F) -> Result<Vec<usize>>
    where
        F: FnMut(LayerConfig) -> LayerConfig,
    {
        let mut staged = self.registry.clone();
        let updated = staged.update_all(transform);
        self.commit(staged, &updated)?;
        Ok(updated)
    }

    /// Recolour layer `index` starting from the default layer config
    pub fn update_colors(&mut self, index: usize, colors: [String; 2]) -> Result<()> {
        let [ambient, diffuse] = colors;
        let mut config = self.settings.default_layer.clone();
        config.set_light_color("ambient", 1, &ambient);
        config.set_light_color("diffuse", 1, &diffuse);
        self.update_layer(index, config)
    }

    /// Size every mirror layer to a `width` x `height` viewport and rebuild
    ///
    /// A failed rebuild leaves the previous sizes in place.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        let resized = self
            .registry
            .resized(width, height, self.settings.resize_factor);
        let indices = resized.mirror_indices();
        self.commit(resized, &indices)?;
        info!("Resized mirror layers for {}x{} viewport", width, height);
        Ok(())
    }

    /// Rebuild every mirror layer from its current config
    pub fn rebuild_all(&mut self) -> Result<()> {
        let indices = self.registry.mirror_indices();
        self.commit(self.registry.clone(), &indices)
    }

    /// Build `indices` from `registry` in parallel, then swap `registry` in
    /// and publish the scenes. Nothing changes unless every build succeeds.
    fn commit(&mut self, registry: LayerRegistry, indices: &[usize]) -> Result<()> {
        let built = indices
            .par_iter()
            .filter_map(|&index| registry.get(index).map(|layer| (index, layer)))
            .map(|(index, layer)| scene::build(&layer.config, None).map(|scene| (index, scene)))
            .collect::<Result<Vec<_>>>()?;

        debug!("Rebuilt {} scenes", built.len());
        self.registry = registry;
        for (index, scene) in built {
            self.publish_scene(index, scene);
        }
        Ok(())
    }

    fn publish_scene(&mut self, index: usize, scene: Scene) {
        if let Some(layer) = self.registry.get(index) {
            let config = layer.config.clone();
            self.bridge
                .send(BridgeCommand::ConfigureMirroredFss { config, index });
        }
        self.bridge.send(BridgeCommand::RebuildFss {
            scene: scene.clone(),
            index,
        });
        self.cache.insert(index, scene);
    }

    /// Partial state as the render side would report it
    pub fn current_state(&self) -> ExportedState {
        self.globals.with_registry_layers(&self.registry)
    }

    /// Pause the render side and serialize `current_state_json` filled
    /// with registry configs and scene fuzz
    pub fn export_state(&mut self, current_state_json: &str) -> Result<String> {
        self.bridge.send(BridgeCommand::Pause);
        state::export_state(current_state_json, &self.registry, &self.cache)
    }

    /// Export and bundle with the standalone player
    ///
    /// Only one archive export may run at a time. Asset fetch failures
    /// abort before any state is read.
    pub fn export_archive(&mut self, current_state_json: &str) -> Result<Vec<u8>> {
        let _permit = self.export_gate.try_acquire()?;

        let player_bundle = self.assets.fetch(&self.settings.player_bundle)?;
        let player_html = self.assets.fetch(&self.settings.player_html)?;

        let scene_json = self.export_state(current_state_json)?;
        state::package(
            &self.settings.global_name,
            &scene_json,
            &player_bundle,
            &player_html,
        )
    }

    /// Replace the whole session with the snapshot in `text`
    ///
    /// On any error the registry and cache are left as they were.
    pub fn import(&mut self, text: &str) -> Result<()> {
        let PreparedImport {
            state,
            registry,
            cache,
            wire,
            fragment,
        } = prepare_import(text)?;

        self.registry = registry;
        self.cache = cache;
        self.globals = state.without_layers();

        // layer kinds first so the UI can lay out panels before geometry arrives
        self.bridge.send(BridgeCommand::Pause);
        self.bridge
            .send(BridgeCommand::InitLayers(self.registry.kinds()));
        self.bridge.send(BridgeCommand::Import(wire));

        for index in self.registry.mirror_indices() {
            let (Some(layer), Some(scene)) = (self.registry.get(index), self.cache.get(index))
            else {
                continue;
            };
            let config = layer.config.clone();
            let scene = scene.clone();
            self.bridge
                .send(BridgeCommand::ConfigureMirroredFss { config, index });
            self.bridge.send(BridgeCommand::RebuildFss { scene, index });
        }

        self.publish_fragment(fragment);
        info!("Imported {} layers", self.registry.len());
        Ok(())
    }

    fn publish_fragment(&mut self, fragment: String) {
        self.fragment = Some(fragment.clone());
        self.bridge.send(BridgeCommand::SetFragment(fragment));
    }

    fn change_blend(&mut self, layer: usize, blend: BlendMode) {
        if self.registry.set_blend(layer, blend) {
            let fragment = blends_fragment(self.registry.blends().iter());
            self.publish_fragment(fragment);
        }
    }

    fn notify(&mut self, err: &StrataError) {
        error!("{} [{}]", err, err.error_code());
        self.bridge
            .send(BridgeCommand::Notify(err.friendly_message()));
    }

    /// React to one event from the render side
    pub fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::StartGui(data) => {
                debug!("startGui with palettes {}", data.palettes);
                let [width, height] = self.viewport;
                if let Err(e) = self.resize(width, height) {
                    self.notify(&e);
                }
            }
            BridgeEvent::Bang => {
                self.bridge
                    .send(BridgeCommand::InitLayers(self.registry.kinds()));
            }
            BridgeEvent::Viewport { width, height } => self.set_viewport(width, height),
            BridgeEvent::Export(current) => match self.export_state(&current) {
                Ok(code) => self.bridge.send(BridgeCommand::ShowExport(code)),
                Err(e) => self.notify(&e),
            },
            BridgeEvent::ExportZip(current) => match self.export_archive(&current) {
                Ok(bytes) => {
                    let file_name = self.settings.archive_name.clone();
                    self.bridge
                        .send(BridgeCommand::SaveArchive { file_name, bytes });
                }
                Err(e) => self.notify(&e),
            },
            BridgeEvent::Import(text) => {
                if text.trim().is_empty() {
                    self.bridge
                        .send(BridgeCommand::Notify(NOTHING_TO_IMPORT.to_string()));
                } else if let Err(e) = self.import(&text) {
                    self.notify(&e);
                }
            }
            BridgeEvent::UpdateLayer { index, config } => {
                if let Err(e) = self.update_layer(index, config) {
                    self.notify(&e);
                }
            }
            BridgeEvent::UpdateColors { index, colors } => {
                if let Err(e) = self.update_colors(index, colors) {
                    self.notify(&e);
                }
            }
            BridgeEvent::ChangeWglBlend { layer, blend } => {
                self.change_blend(layer, blend.clone());
                self.bridge
                    .send(BridgeCommand::ChangeWglBlend { layer, blend });
            }
            BridgeEvent::ChangeSvgBlend { layer, blend } => {
                self.change_blend(layer, blend.clone());
                self.bridge
                    .send(BridgeCommand::ChangeSvgBlend { layer, blend });
            }
            BridgeEvent::ChangeProduct(id) => {
                self.bridge.send(BridgeCommand::ChangeProduct(id));
            }
        }
    }
}
