//! Core simulation loop.
//!
//! The simulation owns the board, both factions, the event log and its
//! own random generator, and advances one turn at a time until a
//! termination condition fires or the turn cap is reached.
//!
//! # Determinism
//!
//! - Capture progress uses fixed-point math via [`Fixed`](crate::math::Fixed)
//! - All randomness comes from the generator owned by the simulation
//! - Iteration order is fixed: faction A then B, roster order within each
//! - Same configuration and seed always produce the same log
//!
//! # Example
//!
//! ```
//! use capture_core::config::SimulationConfig;
//! use capture_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(SimulationConfig::new(25).with_seed(3)).unwrap();
//! let outcome = sim.run();
//! assert!(outcome.turns <= sim.max_turns());
//! assert_eq!(outcome.tiles.total(), 80);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::events::SimEvent;
use crate::factions::{Faction, FactionId, Factions};
use crate::grid::{Grid, TileTally, CAPTURE_THRESHOLD};
use crate::math::{Fixed, Position};
use crate::spawn::spawn_roster;
use crate::stats::MatchStats;
use crate::systems::{TurnContext, TurnRules};
use crate::units::UnitId;
use crate::victory::{check_victory, EndCondition, MatchResult};

/// Everything a finished match reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Result label, decided by tile count.
    pub result: MatchResult,
    /// Turns played.
    pub turns: u32,
    /// Ordered, human-readable event log.
    pub log: Vec<String>,
    /// Why the match stopped.
    pub end_condition: EndCondition,
    /// Final tile ownership.
    pub tiles: TileTally,
    /// Per-faction counters.
    pub stats: MatchStats,
}

impl MatchOutcome {
    /// Whether the tile-count result credits a different side than the
    /// condition that ended the match.
    #[must_use]
    pub fn result_disagrees_with_end(&self) -> bool {
        match self.end_condition.favored() {
            Some(faction) => self.result.winner() != Some(faction),
            None => false,
        }
    }
}

/// Events generated during one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnEvents {
    /// Turn number that was played, or 0 if the match had already ended.
    pub turn: u32,
    /// Everything that happened, in order.
    pub events: Vec<SimEvent>,
    /// Set if this turn ended the match.
    pub end: Option<EndCondition>,
}

/// A single territory capture match.
///
/// # Turn Order
///
/// Each turn:
/// 1. **Faction A** - each unit alive at segment start acts once
/// 2. **Faction B** - same
/// 3. **Maintenance** - capture progress decays on every tile
/// 4. **Victory check**
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    factions: Factions,
    rng: ChaCha8Rng,
    seed: Option<u64>,
    turn: u32,
    max_turns: u32,
    next_unit_id: UnitId,
    events: Vec<SimEvent>,
    log: Vec<String>,
    end_condition: Option<EndCondition>,
}

impl Simulation {
    /// Build a match, seeding the generator from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGrid`](crate::error::GameError::InvalidGrid)
    /// if the grid dimensions cannot hold a match.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.seed))?;
        sim.seed = Some(config.seed);
        Ok(sim)
    }

    /// Build a match that draws from an explicitly supplied generator.
    ///
    /// `config.seed` is kept in [`config`](Self::config) but plays no part
    /// in the run, and [`seed`](Self::seed) reports `None`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_rng(config: SimulationConfig, rng: ChaCha8Rng) -> Result<Self> {
        let config = SimulationConfig {
            level: config.clamped_level(),
            ..config
        };

        let mut grid = Grid::new(config.width, config.height)?;
        let mid = (config.height / 2) as i32;
        let base_a = Position::new(0, mid);
        let base_b = Position::new(config.width as i32 - 1, mid);

        for (faction, base) in [(FactionId::A, base_a), (FactionId::B, base_b)] {
            if let Some(tile) = grid.tile_mut(base) {
                tile.make_base(faction);
            }
        }

        let mut a = Faction::new(FactionId::A, base_a);
        let mut b = Faction::new(FactionId::B, base_b);
        let mut next_unit_id: UnitId = 1;
        spawn_roster(&mut a, &config, &mut next_unit_id);
        spawn_roster(&mut b, &config, &mut next_unit_id);
        let factions = Factions::new(a, b);

        let end_condition = check_victory(&grid, &factions);

        tracing::debug!(
            level = config.level,
            width = config.width,
            height = config.height,
            seed = config.seed,
            units_per_faction = config.roster_size(),
            "Simulation created"
        );

        Ok(Self {
            max_turns: config.max_turns(),
            config,
            grid,
            factions,
            rng,
            seed: None,
            turn: 0,
            next_unit_id,
            events: Vec::new(),
            log: Vec::new(),
            end_condition,
        })
    }

    /// Configuration in effect (level already clamped).
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed the generator was built from, or `None` if it was injected
    /// through [`with_rng`](Self::with_rng).
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Turns played so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Turn cap.
    #[must_use]
    pub const fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// The board.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Both factions.
    #[must_use]
    pub const fn factions(&self) -> &Factions {
        &self.factions
    }

    /// One faction.
    #[must_use]
    pub const fn faction(&self, id: FactionId) -> &Faction {
        self.factions.get(id)
    }

    /// Id the next spawned unit would receive.
    #[must_use]
    pub const fn next_unit_id(&self) -> UnitId {
        self.next_unit_id
    }

    /// Human-readable log so far.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Typed events so far.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Termination condition, once one has fired.
    #[must_use]
    pub const fn end_condition(&self) -> Option<EndCondition> {
        self.end_condition
    }

    /// Whether no more turns will be played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.end_condition.is_some() || self.turn >= self.max_turns
    }

    /// Play one turn. Does nothing once the match is finished.
    pub fn step(&mut self) -> TurnEvents {
        if self.is_finished() {
            return TurnEvents::default();
        }

        let turn = self.turn + 1;
        let mut events = Vec::new();
        TurnContext {
            grid: &mut self.grid,
            factions: &mut self.factions,
            rng: &mut self.rng,
            rules: TurnRules {
                combat_jitter: self.config.combat_jitter,
                idle_wander: self.config.idle_wander,
            },
            turn,
            events: &mut events,
        }
        .run_turn();
        self.turn = turn;

        for event in &events {
            let line = event.to_string();
            tracing::debug!(turn, "{line}");
            self.log.push(line);
        }
        self.events.extend_from_slice(&events);

        #[cfg(feature = "debug-validation")]
        {
            let violations = self.invariant_violations();
            assert!(violations.is_empty(), "Invariant violations: {violations:?}");
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(turn, state_hash = hash, "Simulation state hash");
        }

        self.end_condition = check_victory(&self.grid, &self.factions);
        if let Some(end) = self.end_condition {
            tracing::info!(turn, end = %end, "Match decided");
        }

        TurnEvents {
            turn,
            events,
            end: self.end_condition,
        }
    }

    /// Play until the match ends and report the outcome.
    ///
    /// The loop is bounded by [`max_turns`](Self::max_turns).
    pub fn run(&mut self) -> MatchOutcome {
        while !self.is_finished() {
            self.step();
        }
        let outcome = self.outcome();
        tracing::info!(
            result = %outcome.result,
            turns = outcome.turns,
            end = %outcome.end_condition,
            tiles_a = outcome.tiles.faction_a,
            tiles_b = outcome.tiles.faction_b,
            "Match finished"
        );
        outcome
    }

    /// Snapshot of the outcome as things stand.
    #[must_use]
    pub fn outcome(&self) -> MatchOutcome {
        let tiles = self.grid.tally();
        MatchOutcome {
            result: MatchResult::from_tally(&tiles),
            turns: self.turn,
            log: self.log.clone(),
            end_condition: self.end_condition.unwrap_or(EndCondition::TurnLimit),
            tiles,
            stats: MatchStats::from_events(&self.events),
        }
    }

    /// Hash of the full board state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);

        for tile in self.grid.tiles() {
            tile.owner().hash(&mut hasher);
            tile.capture_progress().to_bits().hash(&mut hasher);
        }

        for faction in self.factions.iter() {
            for unit in faction.units() {
                unit.id().hash(&mut hasher);
                unit.position().hash(&mut hasher);
                unit.hp().hash(&mut hasher);
            }
        }

        self.log.len().hash(&mut hasher);
        hasher.finish()
    }

    /// Describe every broken invariant. Empty when the state is sound.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let threshold = Fixed::from_num(CAPTURE_THRESHOLD);

        for tile in self.grid.tiles() {
            let progress = tile.capture_progress();
            if progress < Fixed::ZERO || progress >= threshold {
                violations.push(format!(
                    "tile {} progress {progress} outside [0, {CAPTURE_THRESHOLD})",
                    tile.position()
                ));
            }
        }

        let tally = self.grid.tally();
        if tally.total() != self.grid.tile_count() {
            violations.push(format!(
                "tile tally {} != tile count {}",
                tally.total(),
                self.grid.tile_count()
            ));
        }

        for faction in self.factions.iter() {
            for unit in faction.units() {
                if unit.hp() > unit.max_hp() {
                    violations.push(format!("unit {} hp {} > max {}", unit.id(), unit.hp(), unit.max_hp()));
                }
                if !self.grid.in_bounds(unit.position()) {
                    violations.push(format!("unit {} off grid at {}", unit.id(), unit.position()));
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::grid::TileOwner;
    use crate::units::UnitKind;

    #[test]
    fn test_new_places_bases_and_rosters() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        let a = sim.faction(FactionId::A);
        let b = sim.faction(FactionId::B);

        assert_eq!(a.base(), Position::new(0, 4));
        assert_eq!(b.base(), Position::new(9, 4));
        assert_eq!(
            sim.grid().tile(a.base()).unwrap().owner(),
            TileOwner::Faction(FactionId::A)
        );
        assert_eq!(sim.grid().tile(b.base()).unwrap().defense(), 50);
        assert_eq!(a.units().len(), 3);
        assert_eq!(b.units()[0].id(), 4);
        assert_eq!(sim.next_unit_id(), 7);
        assert_eq!(sim.end_condition(), None);
        assert_eq!(sim.turn(), 0);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let err = Simulation::new(SimulationConfig::default().with_grid(0, 8)).unwrap_err();
        assert!(matches!(err, GameError::InvalidGrid { .. }));
    }

    #[test]
    fn test_level_clamped_at_construction() {
        let config = SimulationConfig {
            level: 500,
            ..SimulationConfig::default()
        };
        let sim = Simulation::new(config).unwrap();
        assert_eq!(sim.config().level, 100);
        assert_eq!(sim.max_turns(), 500);
        assert_eq!(sim.faction(FactionId::A).units()[0].kind(), UnitKind::Scout);
    }

    #[test]
    fn test_step_after_finish_is_noop() {
        let mut sim = Simulation::new(SimulationConfig::new(40).with_seed(1)).unwrap();
        let outcome = sim.run();
        let hash = sim.state_hash();
        let events = sim.step();
        assert_eq!(events.turn, 0);
        assert!(events.events.is_empty());
        assert_eq!(sim.state_hash(), hash);
        assert_eq!(sim.turn(), outcome.turns);
    }

    #[test]
    fn test_log_mirrors_events() {
        let mut sim = Simulation::new(SimulationConfig::new(60).with_seed(5)).unwrap();
        sim.run();
        assert_eq!(sim.log().len(), sim.events().len());
        for (line, event) in sim.log().iter().zip(sim.events()) {
            assert_eq!(line, &event.to_string());
        }
    }

    #[test]
    fn test_outcome_disagreement_flag() {
        let outcome = MatchOutcome {
            result: MatchResult::Draw,
            turns: 10,
            log: Vec::new(),
            end_condition: EndCondition::BaseCaptured {
                base_of: FactionId::B,
            },
            tiles: TileTally {
                faction_a: 3,
                faction_b: 3,
                neutral: 74,
            },
            stats: MatchStats::default(),
        };
        assert!(outcome.result_disagrees_with_end());

        let agreeing = MatchOutcome {
            result: MatchResult::FactionAWins,
            ..outcome.clone()
        };
        assert!(!agreeing.result_disagrees_with_end());

        let limit = MatchOutcome {
            end_condition: EndCondition::TurnLimit,
            ..outcome
        };
        assert!(!limit.result_disagrees_with_end());
    }
}
