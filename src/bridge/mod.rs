//! Render/UI Bridge
//!
//! The core never touches the render side directly. It sends
//! `BridgeCommand`s through a `RenderBridge` and reacts to `BridgeEvent`s
//! handed to `Session::handle_event`. Both are plain serde types so a host
//! can move them across any transport.

use std::sync::mpsc::Sender;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layers::{BlendMode, LayerConfig, LayerKind};
use crate::scene::Scene;

/// Core -> render side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum BridgeCommand {
    /// Stop animating so state reads do not tear
    Pause,
    InitLayers(Vec<LayerKind>),
    /// Sanitized global state, see `ImportWire`
    Import(String),
    ConfigureMirroredFss { config: LayerConfig, index: usize },
    RebuildFss { scene: Scene, index: usize },
    #[serde(rename = "changeWGLBlend")]
    ChangeWglBlend { layer: usize, blend: BlendMode },
    #[serde(rename = "changeSVGBlend")]
    ChangeSvgBlend { layer: usize, blend: BlendMode },
    ChangeProduct(Value),
    /// Addressable state, e.g. `#blends=add:normal`
    SetFragment(String),
    ShowExport(String),
    SaveArchive { file_name: String, bytes: Vec<u8> },
    /// User-visible failure notice
    Notify(String),
}

/// Data carried by `startGui`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuiData {
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub palettes: Value,
}

/// Render side -> core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum BridgeEvent {
    /// GUI is up: resize to the current viewport and rebuild
    StartGui(GuiData),
    /// Initial kick
    Bang,
    Viewport { width: f64, height: f64 },
    Export(String),
    ExportZip(String),
    Import(String),
    UpdateLayer { index: usize, config: LayerConfig },
    UpdateColors { index: usize, colors: [String; 2] },
    #[serde(rename = "changeWGLBlend")]
    ChangeWglBlend { layer: usize, blend: BlendMode },
    #[serde(rename = "changeSVGBlend")]
    ChangeSvgBlend { layer: usize, blend: BlendMode },
    ChangeProduct(Value),
}

/// Sink for commands addressed to the render side
pub trait RenderBridge {
    fn send(&mut self, command: BridgeCommand);
}

impl<B: RenderBridge + ?Sized> RenderBridge for Box<B> {
    fn send(&mut self, command: BridgeCommand) {
        (**self).send(command)
    }
}

/// Keeps every command in memory, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    commands: Vec<BridgeCommand>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[BridgeCommand] {
        &self.commands
    }

    /// Drain the log
    pub fn take(&mut self) -> Vec<BridgeCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Messages of every `Notify` command
    pub fn notifications(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                BridgeCommand::Notify(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderBridge for RecordingBridge {
    fn send(&mut self, command: BridgeCommand) {
        self.commands.push(command);
    }
}

/// Forwards commands over an mpsc channel to a render thread
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    sender: Sender<BridgeCommand>,
}

impl ChannelBridge {
    pub fn new(sender: Sender<BridgeCommand>) -> Self {
        Self { sender }
    }
}

impl RenderBridge for ChannelBridge {
    fn send(&mut self, command: BridgeCommand) {
        if self.sender.send(command).is_err() {
            warn!("Render side hung up, dropping command");
        }
    }
}
