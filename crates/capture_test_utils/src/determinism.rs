//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A match must replay exactly from its configuration and seed.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: capture progress is fixed-point via
//!   [`capture_core::math::Fixed`] and damage is integer tenths.
//!
//! - **Iteration order**: factions always act A then B, units in roster
//!   order, neighbors right, left, down, up.
//!
//! - **System randomness**: every roll comes from the generator owned
//!   by the [`Simulation`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual systems (combat, capture, decay)
//! 2. **Property tests**: random configs must still replay exactly
//! 3. **Integration tests**: full matches are reproducible
//! 4. **Parallel tests**: N matches on N threads all agree

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::panic;
use std::thread;

use capture_core::config::SimulationConfig;
use capture_core::simulation::{MatchOutcome, Simulation};

use crate::fixtures::simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns simulated.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of turns each simulation ran.
    pub turns: u32,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Turns: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use capture_core::config::SimulationConfig;
/// use capture_core::simulation::Simulation;
/// use capture_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     50,
///     || Simulation::new(SimulationConfig::new(30).with_seed(9)).unwrap(),
///     |sim| { sim.step(); },
///     Simulation::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Run the same configuration twice for `turns` turns and compare the
/// final state hashes.
///
/// # Panics
///
/// Panics if `config` describes an invalid grid.
#[must_use]
pub fn verify_simulation_determinism(config: SimulationConfig, turns: u32) -> bool {
    verify_determinism(
        2,
        turns,
        || simulation(config),
        |sim| {
            sim.step();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Play `runs` complete matches from the same configuration and check
/// that every outcome, log included, is identical.
///
/// # Panics
///
/// Panics if `config` describes an invalid grid.
#[must_use]
pub fn verify_outcome_determinism(config: SimulationConfig, runs: usize) -> bool {
    let outcomes: Vec<MatchOutcome> = (0..runs).map(|_| simulation(config).run()).collect();
    outcomes.windows(2).all(|w| w[0] == w[1])
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// or memory layout differences.
///
/// # Example
///
/// ```
/// use capture_core::config::SimulationConfig;
/// use capture_test_utils::determinism::run_parallel_simulations_scoped;
///
/// let result = run_parallel_simulations_scoped(SimulationConfig::new(60).with_seed(2), 4, 100);
/// result.assert_deterministic();
/// ```
///
/// # Panics
///
/// Panics if `config` describes an invalid grid, or re-raises a panic
/// from any worker thread.
#[must_use]
pub fn run_parallel_simulations_scoped(
    config: SimulationConfig,
    num_sims: usize,
    turns: u32,
) -> ParallelSimResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(move || {
                    let mut sim = simulation(config);
                    for _ in 0..turns {
                        sim.step();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    });

    ParallelSimResult {
        hashes,
        turns,
        num_sims,
    }
}

/// Compare two runs turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(turn)` for the first turn whose
/// state hashes differ (0 means they differ before the first turn).
pub fn find_first_divergence<F>(setup_fn: F, turns: u32) -> Option<u32>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        sim1.step();
        sim2.step();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Hash the rendered log of a finished match.
///
/// Two matches that print the same lines in the same order hash equal,
/// so logs can be compared across processes without storing them.
#[must_use]
pub fn log_hash(outcome: &MatchOutcome) -> u64 {
    let mut hasher = DefaultHasher::new();
    outcome.turns.hash(&mut hasher);
    for line in &outcome.log {
        line.hash(&mut hasher);
    }
    hasher.finish()
}

/// Proptest strategies for determinism testing.
pub mod strategies {
    use capture_core::config::{SimulationConfig, MAX_LEVEL, MIN_LEVEL};
    use proptest::prelude::*;

    /// Any legal difficulty level.
    pub fn arb_level() -> impl Strategy<Value = u32> {
        MIN_LEVEL..=MAX_LEVEL
    }

    /// Grid sizes from tiny to a little above the default.
    pub fn arb_grid() -> impl Strategy<Value = (u32, u32)> {
        (2u32..=16, 1u32..=12)
    }

    /// A jittered configuration over the full level range.
    pub fn arb_config() -> impl Strategy<Value = SimulationConfig> {
        (arb_level(), arb_grid(), any::<u64>(), any::<bool>()).prop_map(
            |(level, (width, height), seed, idle_wander)| {
                SimulationConfig::new(level)
                    .with_grid(width, height)
                    .with_seed(seed)
                    .with_idle_wander(idle_wander)
            },
        )
    }

    /// A configuration with every random switch off.
    pub fn arb_deterministic_config() -> impl Strategy<Value = SimulationConfig> {
        arb_config().prop_map(SimulationConfig::deterministic)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes(), vec![10]);
    }

    #[test]
    fn test_detects_nondeterminism() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_default_match_determinism() {
        assert!(verify_simulation_determinism(SimulationConfig::default(), 100));
    }

    #[test]
    fn test_high_level_outcome_determinism() {
        assert!(verify_outcome_determinism(
            SimulationConfig::new(100).with_seed(77),
            3
        ));
    }

    #[test]
    fn test_wander_outcome_determinism() {
        assert!(verify_outcome_determinism(
            SimulationConfig::new(45).with_seed(4).with_idle_wander(true),
            3
        ));
    }

    #[test]
    fn test_log_hash_tracks_log() {
        let config = SimulationConfig::new(30).with_seed(8);
        let first = simulation(config).run();
        assert_eq!(log_hash(&first), log_hash(&simulation(config).run()));

        let mut edited = first.clone();
        edited.log.pop();
        assert_ne!(log_hash(&first), log_hash(&edited));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        let config = SimulationConfig::new(20).with_seed(11);
        assert_eq!(find_first_divergence(|| simulation(config), 200), None);
    }

    #[test]
    fn test_find_divergence_on_different_boards() {
        let width = std::cell::Cell::new(9u32);
        let diverged = find_first_divergence(
            || {
                width.set(width.get() + 1);
                simulation(SimulationConfig::default().with_grid(width.get(), 8))
            },
            10,
        );
        assert_eq!(diverged, Some(0));
    }

    #[test]
    fn test_parallel_matches_agree() {
        run_parallel_simulations_scoped(SimulationConfig::new(80).with_seed(3), 4, 150)
            .assert_deterministic();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_same_seed_same_outcome(config in arb_config()) {
            prop_assert!(verify_outcome_determinism(config, 2));
        }

        #[test]
        fn prop_deterministic_config_ignores_seed(config in arb_deterministic_config(), other in any::<u64>()) {
            let a = simulation(config).run();
            let b = simulation(config.with_seed(other)).run();
            prop_assert_eq!(a, b);
        }
    }
}
