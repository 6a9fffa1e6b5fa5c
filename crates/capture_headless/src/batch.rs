//! Batch game runner for balance testing.
//!
//! Runs many matches of one scenario in parallel using rayon, one seed
//! per game, and collects metrics across them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use capture_core::error::GameError;
use capture_core::simulation::Simulation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics};
use crate::scenario::Scenario;

/// Error saving or loading batch results.
#[derive(Error, Debug)]
pub enum BatchIoError {
    /// Filesystem failure.
    #[error("Batch results I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed or unserializable JSON.
    #[error("Batch results JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run
    pub scenario: Scenario,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Seed of the first game; game `i` uses `seed_start + i`
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::skirmish(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: Scenario, game_count: u32) -> Self {
        Self {
            scenario,
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Cap the worker count
    pub fn with_parallelism(mut self, games: u32) -> Self {
        self.parallel_games = games;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics, in seed order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<(), BatchIoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self, BatchIoError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total games
    pub total: u32,
    /// Completed games
    pub completed: AtomicU32,
    /// Start time
    pub start_time: Instant,
    /// Partial results for live stats
    partial_wins: Mutex<HashMap<String, u32>>,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            start_time: Instant::now(),
            partial_wins: Mutex::new(HashMap::new()),
        }
    }

    /// Record a completed game
    pub fn record_completion(&self, winner: Option<&str>) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Some(w) = winner {
            if let Ok(mut wins) = self.partial_wins.lock() {
                *wins.entry(w.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_game = elapsed.as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Get current win rates
    pub fn current_win_rates(&self) -> HashMap<String, f64> {
        let completed = self.current();
        if completed == 0 {
            return HashMap::new();
        }

        match self.partial_wins.lock() {
            Ok(wins) => wins
                .iter()
                .map(|(k, v)| (k.clone(), f64::from(*v) / f64::from(completed)))
                .collect(),
            Err(_) => HashMap::new(),
        }
    }

    /// Log progress
    pub fn report(&self) {
        let eta = self.eta();
        let mut rates: Vec<_> = self.current_win_rates().into_iter().collect();
        rates.sort_by(|a, b| a.0.cmp(&b.0));
        info!(
            completed = self.current(),
            total = self.total,
            percent = self.percentage(),
            eta_secs = eta.as_secs(),
            win_rates = ?rates,
            "Batch progress"
        );
    }
}

/// Play one game of `scenario` with `seed`.
pub fn run_single_game(scenario: &Scenario, seed: u64) -> Result<GameMetrics, GameError> {
    let config = scenario.to_config().with_seed(seed);
    let mut sim = Simulation::new(config)?;
    let outcome = sim.run();
    Ok(GameMetrics::collect(
        format!("game_{seed}"),
        scenario.name.clone(),
        &sim,
        &outcome,
    ))
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(config.game_count);

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.scenario.name
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));

            match run_single_game(&config.scenario, seed) {
                Ok(metrics) => {
                    progress.record_completion(metrics.winner.as_deref());

                    let completed = progress.current();
                    if completed % 10 == 0 {
                        debug!("Progress: {}/{}", completed, config.game_count);
                    }
                    if completed % 100 == 0 {
                        progress.report();
                    }

                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Game {} failed: {}", i, e);
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by playing the same seed several times.
///
/// Every run must produce identical metrics, final state hash included.
pub fn verify_determinism(scenario: &Scenario, seed: u64, runs: u32) -> Result<bool, GameError> {
    let results = (0..runs)
        .map(|_| run_single_game(scenario, seed))
        .collect::<Result<Vec<_>, _>>()?;

    let identical = results.windows(2).all(|w| w[0] == w[1]);
    if !identical {
        warn!(scenario = %scenario.name, seed, runs, "Runs diverged");
    }
    Ok(identical)
}
