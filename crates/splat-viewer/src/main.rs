use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use splat_engine::config::{SessionConfig, SessionConfigOverrides};
use splat_engine::device::GpuInit;
use splat_engine::logging::{init_logging, LoggingConfig};
use splat_engine::session::RenderSession;
use splat_engine::sort::{CpuSortEngine, SortStrategy};
use splat_engine::window::{Runtime, RuntimeConfig};

mod app;
mod scene;

use app::ViewerApp;

#[derive(Parser, Debug)]
#[command(name = "splat-viewer")]
#[command(about = "Sorted, alpha-blended Gaussian splat viewer")]
struct Cli {
    /// JSON scene with flat `positions`, `colors`, `scales` and `rotors` arrays
    #[arg(short, long, conflicts_with = "demo")]
    scene: Option<PathBuf>,

    /// Generate a procedural cloud of this many particles instead of loading a scene
    #[arg(long)]
    demo: Option<usize>,

    /// Seed for `--demo`
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Session configuration (JSON). Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sort strategy: "full" or "grouped"
    #[arg(long)]
    strategy: Option<SortStrategy>,

    /// Re-sort every N frames
    #[arg(long)]
    sort_interval: Option<u32>,

    /// Particles per group; the loaded count is truncated to a multiple of it
    #[arg(long)]
    group_size: Option<u32>,

    /// Log filter in env_logger syntax, e.g. "debug" or "splat_engine=debug"
    #[arg(long)]
    log: Option<String>,
}

const DEFAULT_DEMO_COUNT: usize = 64 * 1024;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    let overrides = SessionConfigOverrides {
        group_size: cli.group_size,
        strategy: cli.strategy,
        sort_interval: cli.sort_interval,
    };
    if !overrides.is_empty() {
        log::info!("command line overrides: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let (attributes, title) = match &cli.scene {
        Some(path) => (scene::load_scene(path)?, format!("splat | {}", path.display())),
        None => {
            let count = cli.demo.unwrap_or(DEFAULT_DEMO_COUNT);
            (scene::demo_cloud(count, cli.seed)?, "splat | demo".to_string())
        }
    };

    // Everything that can be rejected without a GPU is rejected here.
    let session = RenderSession::new(&config, attributes, CpuSortEngine::new())
        .context("Failed to set up the render session")?;

    let gpu_init = GpuInit {
        prefer_srgb: false,
        min_texture_dimension_2d: {
            let (w, h) = session.layout().texture_size();
            w.max(h)
        },
        ..GpuInit::default()
    };

    Runtime::run(
        RuntimeConfig {
            title: title.clone(),
            ..RuntimeConfig::default()
        },
        gpu_init,
        ViewerApp::new(session, title),
    )
}
