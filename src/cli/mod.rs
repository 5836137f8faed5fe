//! CLI Module
//!
//! Command-line interface for working with layer snapshots.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata - capture, rebuild and package layer stack snapshots
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a fresh snapshot built from the default layer config
    #[command(name = "new")]
    New {
        /// Number of mirrored surface layers
        #[arg(short, long, default_value_t = 2)]
        mirrors: usize,

        /// Number of vector overlay layers stacked on top
        #[arg(long, default_value_t = 1)]
        svg: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a snapshot and print a summary
    #[command(name = "inspect")]
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// Import a snapshot, optionally resize, and export it again
    #[command(name = "rebuild")]
    Rebuild {
        /// Snapshot file
        snapshot: PathBuf,

        /// Viewport width to resize mirror layers for
        #[arg(long, requires = "height")]
        width: Option<f64>,

        /// Viewport height to resize mirror layers for
        #[arg(long, requires = "width")]
        height: Option<f64>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Bundle a snapshot with the standalone player into a zip
    #[command(name = "package")]
    Package {
        /// Snapshot file
        snapshot: PathBuf,

        /// Directory holding the player assets (overrides settings)
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Output archive (defaults to the settings archive name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
