mod config;
mod engine;
mod game;
mod input;
mod render;
mod snake;
mod term;

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, WriteLogger};

use config::{GameConfig, Overrides};

pub type TermInt = u16;
pub type GridInt = u16;

#[derive(Parser)]
#[command(name = "snake")]
#[command(version, about = "Snake on a wrap-around grid, in the terminal")]
struct Cli {
    /// Grid width in cells
    #[arg(long)]
    width: Option<GridInt>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<GridInt>,

    /// Milliseconds between moves
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for food placement, for repeatable games
    #[arg(long)]
    seed: Option<u64>,

    /// YAML file with default settings
    #[arg(long, default_value = "snake.yaml")]
    config: PathBuf,

    #[arg(long)]
    log_file: Option<String>,

    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GameConfig::load(&cli.config)?.apply(Overrides {
        grid_width: cli.width,
        grid_height: cli.height,
        tick_ms: cli.tick_ms,
        seed: cli.seed,
        log_file: cli.log_file,
        log_level: cli.log_level,
    });
    config.validate()?;

    // The terminal belongs to the game, so logs go to a file
    WriteLogger::init(
        config.level_filter()?,
        Config::default(),
        File::create(&config.log_file).with_context(|| format!("Failed to create log file {}", config.log_file))?,
    )
    .context("Failed to initialize logger")?;

    info!(
        "Starting {}x{} game, {} ms per tick, seed {:?}",
        config.grid_width, config.grid_height, config.tick_ms, config.seed
    );

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    game::SnakeGame::new(&config, rng)?.run()
}
