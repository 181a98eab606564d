//! hotpad - simulated controller hot-plug session
//!
//! Runs a [`ControllerHub`](hotpad_registry::ControllerHub) against the mock
//! backend, plugs and unplugs simulated controllers, and logs every event
//! and query result.
//!
//! # Usage
//!
//! ```bash
//! # Default session: two gamepads, one raw controller, three hot-plug cycles
//! hotpad
//!
//! # Custom hub configuration
//! hotpad --config hotpad.toml
//!
//! # Bigger session with a JSON summary on stdout
//! hotpad --gamepads 4 --raw-controllers 3 --cycles 10 --json
//!
//! # Enable debug logging
//! RUST_LOG=hotpad_registry=debug hotpad
//! ```

mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotpad_registry::HubConfig;
use simulation::{Session, SessionPlan};

/// Simulated game controller hot-plug session
#[derive(Parser, Debug)]
#[command(name = "hotpad", version, about)]
struct Args {
    /// Hub configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gamepads attached before the hub starts
    #[arg(long, default_value_t = 2)]
    gamepads: usize,

    /// Raw controllers attached before the hub starts
    #[arg(long, default_value_t = 1)]
    raw_controllers: usize,

    /// Number of plug/unplug cycles to simulate
    #[arg(long, default_value_t = 3)]
    cycles: usize,

    /// Print the final registry state as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?,
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HubConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => HubConfig::default(),
    };

    info!(version = hotpad_core::VERSION, ?config, "Starting hotpad session");

    let plan = SessionPlan {
        gamepads: args.gamepads,
        raw_controllers: args.raw_controllers,
        cycles: args.cycles,
    };

    let session = Session::new(config, &plan);
    session.start().context("Failed to start controller hub")?;
    session.run(&plan)?;

    let summary = session.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            gamepad_slots = summary.gamepad_slots,
            connected_gamepads = summary.connected_gamepads.len(),
            raw_controllers = summary.raw_controllers.len(),
            events = summary.events,
            "Session complete"
        );
    }

    session.shutdown();
    Ok(())
}
