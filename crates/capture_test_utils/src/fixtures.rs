//! Test fixtures and helpers.
//!
//! Pre-built configurations and fixed-point shorthands for consistent
//! testing.

use capture_core::config::SimulationConfig;
use capture_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Easiest match: three level-1 infantry per side, no randomness.
#[must_use]
pub fn level_one_config() -> SimulationConfig {
    SimulationConfig::new(1).deterministic()
}

/// Hardest match: nine level-10 units per side, jitter on.
#[must_use]
pub fn level_hundred_config(seed: u64) -> SimulationConfig {
    SimulationConfig::new(100).with_seed(seed)
}

/// A small board where contact happens within a couple of turns.
#[must_use]
pub fn skirmish_config(level: u32, seed: u64) -> SimulationConfig {
    SimulationConfig::new(level).with_grid(4, 3).with_seed(seed)
}

/// Build a simulation from a config known to be valid.
///
/// # Panics
///
/// Panics if `config` describes an invalid grid.
#[must_use]
pub fn simulation(config: SimulationConfig) -> Simulation {
    match Simulation::new(config) {
        Ok(sim) => sim,
        Err(err) => panic!("fixture config rejected: {err}"),
    }
}
