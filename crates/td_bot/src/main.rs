//! Tower-defense autopilot tools.
//!
//! Offline planning and inspection on top of the decision core. Live play
//! needs platform capture and input backends and is driven through
//! [`td_bot::Session`] by the program embedding them.
//!
//! # Usage
//!
//! ```bash
//! # Best next action for a saved snapshot
//! cargo run -p td_bot -- decide --config data/bot.ron --snapshot data/snapshot.ron
//!
//! # Screen route between two screens
//! cargo run -p td_bot -- path --from "Main Menu" --to "In Game"
//!
//! # Best placement for one unit on the configured track
//! cargo run -p td_bot -- placement --config data/bot.ron --unit "Dart Monkey"
//!
//! # Check the catalog and every track folder
//! cargo run -p td_bot -- validate --config data/bot.ron
//! ```
//!
//! Output (stdout): JSON. Logs (stderr): human-readable.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use td_bot::assets::{load_catalog, load_snapshot, load_track_assets, track_dir, Snapshot};
use td_bot::BotConfig;
use td_core::prelude::*;

#[derive(Parser)]
#[command(name = "td_bot")]
#[command(about = "Tower-defense autopilot planning tools")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the next action for a captured game state
    Decide {
        /// Bot configuration file
        #[arg(short, long, default_value = "data/bot.ron")]
        config: PathBuf,

        /// Snapshot with money and placed units
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Override the snapshot's money
        #[arg(long)]
        money: Option<u32>,
    },

    /// Print the shortest screen route
    Path {
        /// Starting screen
        #[arg(long)]
        from: String,

        /// Target screen
        #[arg(long)]
        to: String,

        /// RON transition graph (defaults to the built-in graph)
        #[arg(long)]
        graph: Option<PathBuf>,
    },

    /// Find the best placement for a unit on the configured track
    Placement {
        /// Bot configuration file
        #[arg(short, long, default_value = "data/bot.ron")]
        config: PathBuf,

        /// Unit to place
        #[arg(short, long)]
        unit: String,

        /// Search stride in raster pixels (defaults to the config value)
        #[arg(long)]
        stride: Option<u32>,
    },

    /// Validate the unit catalog and all track folders
    Validate {
        /// Bot configuration file
        #[arg(short, long, default_value = "data/bot.ron")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries JSON results
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(log_level).into())
                .from_env_lossy(),
        )
        .init();

    let result = match cli.command {
        Commands::Decide {
            config,
            snapshot,
            money,
        } => cmd_decide(&config, snapshot.as_deref(), money),
        Commands::Path { from, to, graph } => cmd_path(&from, &to, graph.as_deref()),
        Commands::Placement {
            config,
            unit,
            stride,
        } => cmd_placement(&config, &unit, stride),
        Commands::Validate { config } => cmd_validate(&config),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BotError::DataParse {
        what: "output".into(),
        message: e.to_string(),
    })?;
    println!("{json}");
    Ok(())
}

/// Load the configured track's map with its pixel scale applied.
fn load_configured_map(config: &BotConfig) -> Result<MapModel> {
    let track = config
        .track
        .ok_or_else(|| BotError::MissingContext("no track configured".into()))?;
    let map = load_track_assets(track_dir(&config.tracks_dir, track))?;
    Ok(map.with_pixel_scale(config.pixels_per_unit))
}

/// Choose the next action for a snapshot
fn cmd_decide(config_path: &Path, snapshot_path: Option<&Path>, money: Option<u32>) -> Result<()> {
    let config = BotConfig::load(config_path)?;
    let catalog = load_catalog(&config.catalog_path)?;
    let mut map = load_configured_map(&config)?;
    let snapshot = match snapshot_path {
        Some(path) => load_snapshot(path)?,
        None => Snapshot::default(),
    };

    for unit in &snapshot.units {
        let footprint = catalog.get(unit.kind)?.footprint.radius();
        map.mark_occupied(unit.position, footprint);
    }
    let roster = Roster::from_units(snapshot.units);
    let money = money.unwrap_or(snapshot.money);

    let ctx = DecisionContext {
        catalog: &catalog,
        map: &map,
        roster: &roster,
        money,
        difficulty: config.difficulty()?,
        probe_stride: config.probe_stride,
        placement_stride: config.placement_stride,
    };
    let best = choose_best_action(&ctx, &config.candidate_units)?;
    match &best {
        Some(action) => tracing::info!(score = action.score, "Best action found"),
        None => tracing::info!(money, "No affordable action"),
    }
    print_json(&best)
}

/// Print the BFS route between two screens
fn cmd_path(from: &str, to: &str, graph_path: Option<&Path>) -> Result<()> {
    let from: Screen = from.parse()?;
    let to: Screen = to.parse()?;
    let graph = BotConfig {
        graph_path: graph_path.map(Path::to_path_buf),
        ..BotConfig::default()
    }
    .transition_graph()?;

    let path = graph.find_path(from, to)?;
    print_json(&path)
}

/// Best placement for one unit
fn cmd_placement(config_path: &Path, unit: &str, stride: Option<u32>) -> Result<()> {
    #[derive(Serialize)]
    struct PlacementReport {
        unit: UnitKind,
        position: NormPos,
        pixel: (u32, u32),
        score: usize,
    }

    let config = BotConfig::load(config_path)?;
    let kind: UnitKind = unit.parse()?;
    let catalog = load_catalog(&config.catalog_path)?;
    let map = load_configured_map(&config)?;

    let candidate = find_best_placement(
        &map,
        catalog.get(kind)?,
        stride.unwrap_or(config.placement_stride),
    )?;
    print_json(&PlacementReport {
        unit: kind,
        position: candidate.position,
        pixel: candidate.pixel,
        score: candidate.score,
    })
}

/// Validate the catalog and every track folder present on disk
fn cmd_validate(config_path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct ValidationReport {
        catalog_units: usize,
        tracks_loaded: Vec<String>,
        problems: Vec<String>,
    }

    let config = BotConfig::load(config_path)?;
    let mut report = ValidationReport {
        catalog_units: 0,
        tracks_loaded: Vec::new(),
        problems: Vec::new(),
    };

    match load_catalog(&config.catalog_path) {
        Ok(catalog) => report.catalog_units = catalog.units.len(),
        Err(e) => report.problems.push(e.to_string()),
    }

    for &track in Track::ALL {
        let dir = track_dir(&config.tracks_dir, track);
        if !dir.is_dir() {
            continue;
        }
        match load_track_assets(&dir) {
            Ok(_) => report.tracks_loaded.push(track.name().to_string()),
            Err(e) => report.problems.push(format!("{track}: {e}")),
        }
    }

    print_json(&report)?;
    if report.problems.is_empty() {
        tracing::info!("Validation passed");
        Ok(())
    } else {
        Err(BotError::DataParse {
            what: config_path.display().to_string(),
            message: format!("{} problem(s) found", report.problems.len()),
        })
    }
}
