//! Scenario loading and configuration.
//!
//! Scenarios name a match setup (difficulty level, board size, seed and
//! randomness switches) so batch runs and CI checks can refer to it by
//! file or by preset name.

use std::path::Path;

use capture_core::config::{SimulationConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Name is neither a preset nor a readable file.
    #[error("Unknown scenario '{0}' (presets: skirmish, siege, sprawl)")]
    UnknownPreset(String),
}

/// Board size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MapSize {
    /// 6x4 tiles. Contact on the first turns.
    Small,
    /// 10x8 tiles.
    #[default]
    Standard,
    /// 20x16 tiles.
    Large,
    /// Explicit width and height.
    Custom(u32, u32),
}

impl MapSize {
    /// Width and height in tiles.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Small => (6, 4),
            Self::Standard => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
            Self::Large => (20, 16),
            Self::Custom(w, h) => (w, h),
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Difficulty level, clamped to 1..=100 when the match is built.
    pub level: u32,
    /// Board size.
    pub map_size: MapSize,
    /// Seed for the match generator.
    pub seed: u64,
    /// Roll combat jitter.
    pub combat_jitter: bool,
    /// Idle units wander to a random neighbor.
    pub idle_wander: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            name: "Default Skirmish".to_string(),
            description: "Level 1 on the standard board".to_string(),
            level: defaults.level,
            map_size: MapSize::Standard,
            seed: defaults.seed,
            combat_jitter: defaults.combat_jitter,
            idle_wander: defaults.idle_wander,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        tracing::debug!(path = %path.display(), name = %scenario.name, "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve a preset name, or fall back to loading `name` as a file.
    pub fn resolve(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "skirmish" | "default" => Ok(Self::skirmish()),
            "siege" => Ok(Self::siege()),
            "sprawl" => Ok(Self::sprawl()),
            other if Path::new(other).exists() => Self::load(other),
            other => Err(ScenarioError::UnknownPreset(other.to_string())),
        }
    }

    /// Mid-level match on the standard board.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "skirmish".to_string(),
            description: "Level 25 on the standard board with combat jitter".to_string(),
            level: 25,
            ..Self::default()
        }
    }

    /// Maximum difficulty on a small board: early contact, scouts and tanks.
    #[must_use]
    pub fn siege() -> Self {
        Self {
            name: "siege".to_string(),
            description: "Level 100 on a small board".to_string(),
            level: 100,
            map_size: MapSize::Small,
            ..Self::default()
        }
    }

    /// Large board where neutral territory dominates the opening.
    #[must_use]
    pub fn sprawl() -> Self {
        Self {
            name: "sprawl".to_string(),
            description: "Level 60 on a large board with idle wander".to_string(),
            level: 60,
            map_size: MapSize::Large,
            idle_wander: true,
            ..Self::default()
        }
    }

    /// Simulation config for this scenario.
    #[must_use]
    pub fn to_config(&self) -> SimulationConfig {
        let (width, height) = self.map_size.dimensions();
        SimulationConfig {
            level: self.level,
            width,
            height,
            seed: self.seed,
            combat_jitter: self.combat_jitter,
            idle_wander: self.idle_wander,
        }
    }
}
