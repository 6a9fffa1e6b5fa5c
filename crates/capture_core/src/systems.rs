//! Turn systems: per-unit action execution and post-turn maintenance.
//!
//! A turn runs these systems in a fixed order:
//!
//! 1. **Faction A segment** - every unit alive at the start of the segment acts
//! 2. **Faction B segment** - same, with a fresh snapshot
//! 3. **Capture decay** - every tile loses a little progress
//!
//! Snapshots are taken per segment, so units killed by faction A are
//! already absent from faction B's snapshot. A unit is also re-checked
//! just before it acts and skipped if it died earlier in the pass.

use rand::Rng;

use crate::combat::{capture_tile, resolve_attack, CombatRoll};
use crate::events::{CaptureSource, SimEvent, UnitTag};
use crate::factions::{FactionId, Factions};
use crate::grid::Grid;
use crate::math::Fixed;
use crate::policy::{decide, Action};
use crate::units::UnitId;

/// Capture progress each tile loses at the end of every turn (0.5).
pub const CAPTURE_DECAY: Fixed = Fixed::from_bits(1 << 31);

/// Switches that control where randomness enters a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnRules {
    /// Roll combat jitter instead of using zero.
    pub combat_jitter: bool,
    /// Move idle units to a random neighbor.
    pub idle_wander: bool,
}

/// Mutable board state a turn operates on.
pub struct TurnContext<'a, R: Rng + ?Sized> {
    /// The board.
    pub grid: &'a mut Grid,
    /// Both rosters.
    pub factions: &'a mut Factions,
    /// The match's random generator.
    pub rng: &'a mut R,
    /// Randomness switches.
    pub rules: TurnRules,
    /// 1-based number of the turn being played.
    pub turn: u32,
    /// Sink for everything that happens.
    pub events: &'a mut Vec<SimEvent>,
}

impl<R: Rng + ?Sized> TurnContext<'_, R> {
    /// Play one full turn: both faction segments, then maintenance.
    pub fn run_turn(&mut self) {
        for faction in FactionId::ALL {
            self.run_faction_segment(faction);
        }
        decay_capture_progress(self.grid);
    }

    /// Let every unit of `faction` that is alive right now act once.
    pub fn run_faction_segment(&mut self, faction: FactionId) {
        let snapshot = self.factions.get(faction).alive_snapshot();
        for id in snapshot {
            self.run_unit(faction, id);
        }
    }

    /// Decide and apply one unit's action. Returns the action taken, or
    /// `None` if the unit is gone or dead.
    pub fn run_unit(&mut self, faction: FactionId, id: UnitId) -> Option<Action> {
        let unit = self.factions.get(faction).unit(id)?;
        if !unit.is_alive() {
            return None;
        }

        let action = decide(unit, self.grid, self.factions);
        match action {
            Action::Attack { target } => self.attack(faction, id, target),
            Action::Capture => self.capture(faction, id),
            Action::Move { to } => {
                if let Some(unit) = self.factions.get_mut(faction).unit_mut(id) {
                    tracing::trace!(turn = self.turn, unit = id, to = %to, "Move");
                    unit.move_to(to);
                }
            }
            Action::Idle => self.idle(faction, id),
        }
        Some(action)
    }

    fn attack(&mut self, faction: FactionId, id: UnitId, target: UnitId) {
        let roll = if self.rules.combat_jitter {
            CombatRoll::roll(self.rng)
        } else {
            CombatRoll::ZERO
        };

        let (own, enemy) = self.factions.split_mut(faction);
        let (Some(attacker), Some(defender)) = (own.unit(id), enemy.unit_mut(target)) else {
            return;
        };
        resolve_attack(attacker, defender, self.grid, roll, self.turn, self.events);
    }

    fn capture(&mut self, faction: FactionId, id: UnitId) {
        let Some(unit) = self.factions.get(faction).unit(id) else {
            return;
        };
        capture_tile(
            self.grid,
            unit.position(),
            UnitTag::from(unit),
            unit.capture_rate(),
            CaptureSource::Action,
            self.turn,
            self.events,
        );
    }

    fn idle(&mut self, faction: FactionId, id: UnitId) {
        if !self.rules.idle_wander {
            return;
        }
        let Some(unit) = self.factions.get_mut(faction).unit_mut(id) else {
            return;
        };
        let options = self.grid.neighbors(unit.position());
        if options.is_empty() {
            return;
        }
        let to = options[self.rng.gen_range(0..options.len())];
        tracing::trace!(turn = self.turn, unit = id, to = %to, "Idle wander");
        unit.move_to(to);
    }
}

/// Post-turn maintenance: every tile's capture progress decays toward
/// zero, floored at zero.
pub fn decay_capture_progress(grid: &mut Grid) {
    for tile in grid.tiles_mut() {
        let progress = tile.capture_progress();
        if progress > Fixed::ZERO {
            tile.set_progress((progress - CAPTURE_DECAY).max(Fixed::ZERO));
        }
    }
}
