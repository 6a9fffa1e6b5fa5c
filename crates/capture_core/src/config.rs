//! Match configuration.

use serde::{Deserialize, Serialize};

/// Lowest difficulty level.
pub const MIN_LEVEL: u32 = 1;

/// Highest difficulty level.
pub const MAX_LEVEL: u32 = 100;

/// Default grid width.
pub const DEFAULT_WIDTH: u32 = 10;

/// Default grid height.
pub const DEFAULT_HEIGHT: u32 = 8;

/// Everything needed to build a [`Simulation`](crate::simulation::Simulation).
///
/// # Example
///
/// ```
/// use capture_core::config::SimulationConfig;
///
/// let config = SimulationConfig::new(250).with_grid(12, 9).with_seed(7);
/// assert_eq!(config.level, 100);
/// assert_eq!(config.max_turns(), 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Difficulty level, clamped to `[1, 100]`.
    pub level: u32,
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Seed for the match's random generator.
    pub seed: u64,
    /// Apply the bounded random perturbations to combat math.
    pub combat_jitter: bool,
    /// Let units with nothing to do step to a random neighbor.
    pub idle_wander: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            level: MIN_LEVEL,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 0,
            combat_jitter: true,
            idle_wander: false,
        }
    }
}

impl SimulationConfig {
    /// Default configuration at the given difficulty level.
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level: clamp_level(level),
            ..Self::default()
        }
    }

    /// Set the grid dimensions.
    #[must_use]
    pub const fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable idle wander.
    #[must_use]
    pub const fn with_idle_wander(mut self, enabled: bool) -> Self {
        self.idle_wander = enabled;
        self
    }

    /// Disable every source of randomness: zero jitter and no wander.
    #[must_use]
    pub const fn deterministic(mut self) -> Self {
        self.combat_jitter = false;
        self.idle_wander = false;
        self
    }

    /// Level after clamping, in case the struct was built field by field.
    #[must_use]
    pub fn clamped_level(&self) -> u32 {
        clamp_level(self.level)
    }

    /// Turn cap for this level: `300 + 2 * level`.
    #[must_use]
    pub fn max_turns(&self) -> u32 {
        300 + self.clamped_level() * 2
    }

    /// Level shared by every spawned unit: `max(1, level / 10)`.
    #[must_use]
    pub fn unit_level(&self) -> u32 {
        (self.clamped_level() / 10).max(1)
    }

    /// Units per faction: `3 + level / 15`.
    #[must_use]
    pub fn roster_size(&self) -> u32 {
        3 + self.clamped_level() / 15
    }
}

fn clamp_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}
