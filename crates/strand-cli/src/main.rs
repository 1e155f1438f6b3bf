//! Strand CLI - Build spline meshes and vegetation layers from a scene file

mod commands;
mod scene_file;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{run, scatter, spline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strand")]
#[command(about = "Terrain-following spline meshes and paged vegetation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every spline mesh in a scene and print its statistics
    Spline {
        /// Path to scene file
        scene: String,

        /// Only this spline
        #[arg(long)]
        name: Option<String>,
    },

    /// Build vegetation pages for every layer
    Scatter {
        /// Path to scene file
        scene: String,

        /// Write a top-down PNG of the scattered instances
        #[arg(short, long)]
        preview: Option<String>,

        /// Preview image edge length in pixels
        #[arg(long, default_value = "512")]
        resolution: u32,
    },

    /// Run the scene for a number of frames along the camera path
    Run {
        /// Path to scene file
        scene: String,

        /// Number of frames to simulate
        #[arg(long, default_value = "60")]
        frames: usize,

        /// Worker threads for vegetation layers (default: rayon's global pool)
        #[arg(long)]
        threads: Option<usize>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Spline { scene, name } => spline::run(&scene, name.as_deref()),
        Commands::Scatter {
            scene,
            preview,
            resolution,
        } => scatter::run(scatter::ScatterArgs {
            scene,
            preview,
            resolution,
        }),
        Commands::Run {
            scene,
            frames,
            threads,
        } => run::run(run::RunArgs {
            scene,
            frames,
            threads,
        }),
    }
}
