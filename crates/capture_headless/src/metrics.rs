//! Game metrics collection for balance analysis.
//!
//! Per-match metrics are taken from a finished [`Simulation`] and its
//! [`MatchOutcome`]; [`BatchSummary`] aggregates them across a batch.

use std::collections::{BTreeMap, HashMap};

use capture_core::factions::FactionId;
use capture_core::grid::TileTally;
use capture_core::simulation::{MatchOutcome, Simulation};
use capture_core::victory::MatchResult;
use serde::{Deserialize, Serialize};

/// Complete metrics for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used, `None` if the generator was injected.
    pub seed: Option<u64>,
    /// Difficulty level after clamping.
    pub level: u32,
    /// Turns played.
    pub duration_turns: u32,
    /// Turn cap for this level.
    pub max_turns: u32,
    /// Result by tile count.
    pub result: MatchResult,
    /// Winning faction by tile count (None = draw).
    pub winner: Option<String>,
    /// Label of the condition that ended the game.
    pub end_condition: String,
    /// Faction the end condition favors, if any.
    pub end_favors: Option<String>,
    /// Whether `winner` and `end_favors` name different sides.
    pub result_disagrees: bool,
    /// Final tile ownership.
    pub tiles: TileTally,
    /// Per-faction metrics, keyed by short faction name.
    pub factions: HashMap<String, FactionMetrics>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Collect metrics from a finished match.
    #[must_use]
    pub fn collect(
        game_id: impl Into<String>,
        scenario: impl Into<String>,
        sim: &Simulation,
        outcome: &MatchOutcome,
    ) -> Self {
        let mut factions = HashMap::new();
        for id in FactionId::ALL {
            let own = outcome.stats.get(id);
            let enemy = outcome.stats.get(id.opponent());
            let roster = sim.faction(id);
            let mut metrics = FactionMetrics {
                faction_id: id.short_name().to_string(),
                tiles_owned: outcome.tiles.owned_by(id),
                units_fielded: roster.units().len() as u32,
                units_alive: roster.alive_count() as u32,
                units_killed: own.kills,
                units_lost: enemy.kills,
                attacks: own.attacks,
                total_damage_dealt: own.damage_dealt,
                total_damage_taken: enemy.damage_dealt,
                capture_actions: own.capture_actions,
                tiles_captured: own.tiles_captured,
                kd_ratio: 0.0,
            };
            metrics.calculate_derived_stats();
            factions.insert(metrics.faction_id.clone(), metrics);
        }

        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed: sim.seed(),
            level: sim.config().level,
            duration_turns: outcome.turns,
            max_turns: sim.max_turns(),
            result: outcome.result,
            winner: outcome.result.winner().map(|f| f.short_name().to_string()),
            end_condition: outcome.end_condition.label().to_string(),
            end_favors: outcome
                .end_condition
                .favored()
                .map(|f| f.short_name().to_string()),
            result_disagrees: outcome.result_disagrees_with_end(),
            tiles: outcome.tiles,
            factions,
            final_state_hash: sim.state_hash(),
        }
    }

    /// Metrics for one faction.
    #[must_use]
    pub fn faction(&self, id: FactionId) -> Option<&FactionMetrics> {
        self.factions.get(id.short_name())
    }
}

/// Metrics for a single faction in a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionMetrics {
    /// Faction identifier.
    pub faction_id: String,
    /// Tiles held at the end.
    pub tiles_owned: u32,

    // === Military ===
    /// Units spawned.
    pub units_fielded: u32,
    /// Units still alive at the end.
    pub units_alive: u32,
    /// Enemy units destroyed.
    pub units_killed: u32,
    /// Own units destroyed.
    pub units_lost: u32,

    // === Combat ===
    /// Attacks made.
    pub attacks: u32,
    /// Total damage dealt.
    pub total_damage_dealt: u64,
    /// Total damage taken.
    pub total_damage_taken: u64,
    /// Kill/death ratio.
    pub kd_ratio: f64,

    // === Territory ===
    /// Capture actions taken.
    pub capture_actions: u32,
    /// Tiles flipped to this faction.
    pub tiles_captured: u32,
}

impl FactionMetrics {
    /// Create new faction metrics.
    #[must_use]
    pub fn new(faction_id: impl Into<String>) -> Self {
        Self {
            faction_id: faction_id.into(),
            ..Default::default()
        }
    }

    /// Calculate final stats. With no losses the ratio is the kill count.
    pub fn calculate_derived_stats(&mut self) {
        self.kd_ratio = f64::from(self.units_killed) / f64::from(self.units_lost.max(1));
    }
}

/// Summary statistics across multiple games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games won by each faction (tile count).
    pub wins_by_faction: HashMap<String, u32>,
    /// Win rates by faction.
    pub win_rates: HashMap<String, f64>,
    /// Draws count.
    pub draws: u32,
    /// Average game duration in turns.
    pub avg_duration_turns: f64,
    /// Shortest game.
    pub min_duration_turns: u32,
    /// Longest game.
    pub max_duration_turns: u32,
    /// How many games ended by each condition.
    pub end_conditions: BTreeMap<String, u32>,
    /// Games whose tile-count result credits a different side than the
    /// condition that ended them.
    pub result_disagreements: u32,

    // === Aggregated Stats ===
    /// Average tiles held at the end by faction.
    pub avg_tiles_owned: HashMap<String, f64>,
    /// Average damage dealt per game by faction.
    pub avg_damage_dealt: HashMap<String, f64>,
    /// Average K/D ratio by faction.
    pub avg_kd_ratio: HashMap<String, f64>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_games: games.len() as u32,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut min_duration = u32::MAX;
        let mut max_duration = 0u32;

        let mut faction_tiles: HashMap<String, Vec<u32>> = HashMap::new();
        let mut faction_damage: HashMap<String, Vec<u64>> = HashMap::new();
        let mut faction_kd: HashMap<String, Vec<f64>> = HashMap::new();

        for game in games {
            duration_sum += u64::from(game.duration_turns);
            min_duration = min_duration.min(game.duration_turns);
            max_duration = max_duration.max(game.duration_turns);

            if let Some(winner) = &game.winner {
                *summary.wins_by_faction.entry(winner.clone()).or_default() += 1;
            } else {
                summary.draws += 1;
            }

            *summary
                .end_conditions
                .entry(game.end_condition.clone())
                .or_default() += 1;
            if game.result_disagrees {
                summary.result_disagreements += 1;
            }

            for (faction_id, faction) in &game.factions {
                faction_tiles
                    .entry(faction_id.clone())
                    .or_default()
                    .push(faction.tiles_owned);
                faction_damage
                    .entry(faction_id.clone())
                    .or_default()
                    .push(faction.total_damage_dealt);
                faction_kd
                    .entry(faction_id.clone())
                    .or_default()
                    .push(faction.kd_ratio);
            }
        }

        summary.avg_duration_turns = duration_sum as f64 / games.len() as f64;
        summary.min_duration_turns = min_duration;
        summary.max_duration_turns = max_duration;

        for (faction, wins) in &summary.wins_by_faction {
            summary.win_rates.insert(
                faction.clone(),
                f64::from(*wins) / f64::from(summary.total_games),
            );
        }

        for (faction, values) in faction_tiles {
            let avg = f64::from(values.iter().sum::<u32>()) / values.len() as f64;
            summary.avg_tiles_owned.insert(faction, avg);
        }

        for (faction, values) in faction_damage {
            let avg = values.iter().sum::<u64>() as f64 / values.len() as f64;
            summary.avg_damage_dealt.insert(faction, avg);
        }

        for (faction, values) in faction_kd {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            summary.avg_kd_ratio.insert(faction, avg);
        }

        summary
    }

    /// Win rate of one faction (0 if it never won).
    #[must_use]
    pub fn win_rate(&self, id: FactionId) -> f64 {
        self.win_rates.get(id.short_name()).copied().unwrap_or(0.0)
    }

    /// Check if faction balance is within acceptable range.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        FactionId::ALL
            .iter()
            .all(|&id| (self.win_rate(id) - 0.5).abs() <= threshold)
    }

    /// Get the dominant faction (if any).
    #[must_use]
    pub fn dominant_faction(&self, threshold: f64) -> Option<FactionId> {
        FactionId::ALL
            .into_iter()
            .find(|&id| self.win_rate(id) > 0.5 + threshold)
    }
}
