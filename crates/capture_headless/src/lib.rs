//! Headless match runner for balance testing and CI verification.
//!
//! Plays territory capture matches without any UI:
//!
//! - **Single runs**: print the event log, final board and outcome
//! - **Batches**: many seeds in parallel, aggregated into win rates and
//!   end-condition counts
//! - **Determinism checks**: one seed replayed several times must match
//!
//! # Example
//!
//! ```bash
//! # Run a scenario
//! cargo run -p capture_headless -- run --scenario scenarios/duel.ron
//!
//! # Verify determinism
//! cargo run -p capture_headless -- verify --seed 9 --runs 10
//! ```

pub mod ascii_visualizer;
pub mod batch;
pub mod metrics;
pub mod scenario;

pub use ascii_visualizer::{render_ascii, render_grid, AsciiConfig};
pub use batch::{run_batch, BatchConfig, BatchIoError, BatchResults};
pub use metrics::{BatchSummary, FactionMetrics, GameMetrics};
pub use scenario::{MapSize, Scenario, ScenarioError};
