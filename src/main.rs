//! Strata CLI - Layer Stack Snapshots
//!
//! Command-line interface for capturing, rebuilding and packaging snapshots.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use strata::cli::{commands, Cli, Commands};
use strata::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Strata v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load_or_default(cli.settings.as_deref())?;

    match cli.command {
        Some(cmd) => handle_command(&settings, cmd),
        None => {
            println!("Strata v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(settings: &Settings, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::New {
            mirrors,
            svg,
            output,
        } => commands::new_snapshot(settings, mirrors, svg, output.as_deref()),
        Commands::Inspect { snapshot } => commands::inspect(settings, &snapshot),
        Commands::Rebuild {
            snapshot,
            width,
            height,
            output,
        } => {
            let viewport = width.zip(height);
            commands::rebuild(settings, &snapshot, viewport, output.as_deref())
        }
        Commands::Package {
            snapshot,
            assets,
            output,
        } => commands::package(settings, &snapshot, assets.as_deref(), output.as_deref()),
    }
}
