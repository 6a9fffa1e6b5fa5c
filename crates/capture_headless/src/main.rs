//! Headless territory capture runner.
//!
//! Plays matches without a UI for balance runs and CI checks.
//!
//! # Usage
//!
//! ```bash
//! # Play one match and print its log and final board
//! cargo run -p capture_headless -- run --scenario skirmish --seed 7
//!
//! # Run a batch of 1000 seeds in parallel
//! cargo run -p capture_headless -- batch --scenario siege --count 1000 --output results/
//!
//! # Check that one seed replays identically
//! cargo run -p capture_headless -- verify --scenario sprawl --seed 42 --runs 5
//! ```
//!
//! Logs go to stderr; match output goes to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capture_core::factions::FactionId;
use capture_core::simulation::Simulation;
use capture_headless::{
    ascii_visualizer::{render_ascii, AsciiConfig},
    batch::{run_batch, verify_determinism, BatchConfig},
    scenario::{MapSize, Scenario},
};

#[derive(Parser)]
#[command(name = "capture_headless")]
#[command(about = "Headless territory capture runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of a scenario.
#[derive(clap::Args, Debug, Clone, Default)]
struct Overrides {
    /// Difficulty level (1-100)
    #[arg(short, long)]
    level: Option<u32>,

    /// Board width and height, e.g. `12x6`
    #[arg(long, value_parser = parse_dimensions)]
    grid: Option<(u32, u32)>,

    /// Let idle units wander
    #[arg(long)]
    wander: bool,

    /// Disable combat jitter
    #[arg(long)]
    no_jitter: bool,
}

impl Overrides {
    fn apply(&self, mut scenario: Scenario) -> Scenario {
        if let Some(level) = self.level {
            scenario.level = level;
        }
        if let Some((w, h)) = self.grid {
            scenario.map_size = MapSize::Custom(w, h);
        }
        if self.wander {
            scenario.idle_wander = true;
        }
        if self.no_jitter {
            scenario.combat_jitter = false;
        }
        scenario
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match
    Run {
        /// Scenario preset or RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print the outcome as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Skip the per-event log
        #[arg(short, long)]
        quiet: bool,

        /// Disable ANSI colors in the board
        #[arg(long)]
        no_color: bool,
    },

    /// Run a batch of matches for balance testing
    Batch {
        /// Scenario preset or RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Verify that a seed replays identically
    Verify {
        /// Scenario preset or RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "5")]
        runs: u32,

        #[command(flatten)]
        overrides: Overrides,
    },
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            seed,
            overrides,
            json,
            quiet,
            no_color,
        } => cmd_run(&scenario, seed, &overrides, json, quiet, no_color),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            overrides,
        } => cmd_batch(&scenario, count, parallel, output, seed, &overrides),
        Commands::Verify {
            scenario,
            seed,
            runs,
            overrides,
        } => cmd_verify(&scenario, seed, runs, &overrides),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(name: &str, overrides: &Overrides) -> Result<Scenario, String> {
    let scenario = Scenario::resolve(name).map_err(|e| e.to_string())?;
    Ok(overrides.apply(scenario))
}

/// Play one match
fn cmd_run(
    scenario: &str,
    seed: Option<u64>,
    overrides: &Overrides,
    json: bool,
    quiet: bool,
    no_color: bool,
) -> Result<ExitCode, String> {
    let mut scenario = load_scenario(scenario, overrides)?;
    if let Some(seed) = seed {
        scenario.seed = seed;
    }
    tracing::info!(
        scenario = %scenario.name,
        level = scenario.level,
        seed = scenario.seed,
        "Starting match"
    );

    let mut sim = Simulation::new(scenario.to_config()).map_err(|e| e.to_string())?;
    let outcome = sim.run();

    if json {
        let text = serde_json::to_string_pretty(&outcome).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    if !quiet {
        for line in &outcome.log {
            println!("{line}");
        }
        println!();
    }

    let config = AsciiConfig {
        use_color: !no_color,
        ..AsciiConfig::default()
    };
    print!("{}", render_ascii(&sim, &config));
    println!();
    println!("Result: {}", outcome.result);
    println!("Ended:  {} after {} turns", outcome.end_condition, outcome.turns);
    if outcome.result_disagrees_with_end() {
        println!("Note:   tile count and end condition favor different sides");
    }
    for id in FactionId::ALL {
        let stats = outcome.stats.get(id);
        println!(
            "{}: {} kills, {} damage, {} tiles captured",
            id.display_name(),
            stats.kills,
            stats.damage_dealt,
            stats.tiles_captured
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Run batch of games for balance testing
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    overrides: &Overrides,
) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario, overrides)?;
    let name = scenario.name.clone();
    let config = BatchConfig::new(scenario, count)
        .with_output(output.clone())
        .with_seed(seed)
        .with_parallelism(parallel);

    let results = run_batch(config);
    let path = output.join(format!("batch_{name}.json"));
    results.save(&path).map_err(|e| e.to_string())?;
    tracing::info!(path = %path.display(), "Saved batch results");

    let summary = &results.summary;
    println!("Games:          {}", summary.total_games);
    for id in FactionId::ALL {
        println!(
            "{} win rate: {:.1}%",
            id.display_name(),
            summary.win_rate(id) * 100.0
        );
    }
    println!("Draws:          {}", summary.draws);
    println!(
        "Turns:          avg {:.1}, min {}, max {}",
        summary.avg_duration_turns, summary.min_duration_turns, summary.max_duration_turns
    );
    for (condition, n) in &summary.end_conditions {
        println!("  {condition:<20} {n}");
    }
    println!("Disagreements:  {}", summary.result_disagreements);

    if results.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(errors = results.errors.len(), "Some games failed");
        Ok(ExitCode::FAILURE)
    }
}

/// Verify determinism
fn cmd_verify(
    scenario: &str,
    seed: u64,
    runs: u32,
    overrides: &Overrides,
) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario, overrides)?;
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    let deterministic = verify_determinism(&scenario, seed, runs).map_err(|e| e.to_string())?;

    if deterministic {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        Ok(ExitCode::FAILURE)
    }
}
