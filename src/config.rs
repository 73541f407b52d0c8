use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use serde::Deserialize;

use crate::GridInt;

pub const INITIAL_SNAKE_LENGTH: GridInt = 3;
pub const MAX_GRID_SIDE: GridInt = 512;

/// Settings for one game, as read from the optional YAML file.
/// Missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: GridInt,
    pub grid_height: GridInt,
    pub tick_ms: u64,
    pub seed: Option<u64>,
    pub log_file: String,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_width: 24,
            grid_height: 18,
            tick_ms: 120,
            seed: None,
            log_file: "snake.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line. Every field set here wins over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub grid_width: Option<GridInt>,
    pub grid_height: Option<GridInt>,
    pub tick_ms: Option<u64>,
    pub seed: Option<u64>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

impl GameConfig {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        GameConfig { grid_width: width, grid_height: height, ..Default::default() }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Failed to deserialize config")
    }

    /// Reads `path`, or returns the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content)
                .with_context(|| format!("Invalid config file {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Failed to read config file {}", path.display())),
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(w) = overrides.grid_width { self.grid_width = w; }
        if let Some(h) = overrides.grid_height { self.grid_height = h; }
        if let Some(ms) = overrides.tick_ms { self.tick_ms = ms; }
        if overrides.seed.is_some() { self.seed = overrides.seed; }
        if let Some(file) = overrides.log_file { self.log_file = file; }
        if let Some(level) = overrides.log_level { self.log_level = level; }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width < INITIAL_SNAKE_LENGTH || self.grid_height < 1 {
            bail!(
                "Grid {}x{} is too small, need at least {}x1",
                self.grid_width, self.grid_height, INITIAL_SNAKE_LENGTH
            );
        }
        if self.grid_width > MAX_GRID_SIDE || self.grid_height > MAX_GRID_SIDE {
            bail!("Grid sides are limited to {} cells", MAX_GRID_SIDE);
        }
        if self.tick_ms == 0 {
            bail!("Tick period must be positive");
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level.parse().with_context(|| format!("Unknown log level '{}'", self.log_level))
    }
}
