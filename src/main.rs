//! blockworld - headless driver for the voxel world core
//!
//! Streams terrain around a simulated observer walking along +X, applies a
//! few scripted edits and writes per-chunk mesh metrics.

mod config;
mod headless;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blockworld_assets::{catalog_from_file, BlockModelCatalog};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the blockworld voxel core", long_about = None)]
struct Args {
    /// World config (TOML); missing or invalid files fall back to defaults
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the streaming radius in chunks
    #[arg(long)]
    render_distance: Option<i32>,

    /// Override the save directory for edit logs
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Number of world updates to run
    #[arg(long, default_value_t = 120)]
    ticks: u64,

    /// Block-model definition (JSON); the built-in atlas layout is used if omitted
    #[arg(long)]
    models: Option<PathBuf>,

    /// Write per-chunk mesh metrics (JSON) to this path
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// Write streaming events (JSON lines) to this path
    #[arg(long)]
    event_log: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting blockworld v{}", env!("CARGO_PKG_VERSION"));
    let args = Args::parse();

    let mut world = config::load_world_config(&args.config);
    if let Some(seed) = args.seed {
        world.seed = seed;
    }
    if let Some(radius) = args.render_distance {
        world.render_distance = radius.clamp(0, 32);
    }
    if let Some(dir) = args.save_dir {
        world.save_dir = dir;
    }

    let catalog = match &args.models {
        Some(path) => catalog_from_file(path)
            .with_context(|| format!("failed to load block models from {}", path.display()))?,
        None => BlockModelCatalog::builtin(),
    };

    info!(
        seed = world.seed,
        render_distance = world.render_distance,
        save_dir = %world.save_dir.display(),
        ticks = args.ticks,
        "Running headless world"
    );

    let summary = headless::run(headless::HeadlessConfig {
        world,
        catalog,
        ticks: args.ticks,
        event_log: args.event_log,
        metrics_out: args.metrics_out,
    })?;

    info!(
        ticks = summary.ticks,
        loaded = summary.loaded,
        added = summary.added,
        removed = summary.removed,
        edits = summary.edits,
        opaque_triangles = summary.opaque_triangles,
        translucent_triangles = summary.translucent_triangles,
        "Headless run finished"
    );
    Ok(())
}
