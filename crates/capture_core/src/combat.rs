//! Combat damage and tile capture resolution.
//!
//! This module implements:
//! - The melee damage formula with bounded jitter
//! - A damage floor so that no attack is ever a no-op
//! - Capture progress accumulation with an immediate ownership flip
//! - The capture bonus granted for killing a defender on foreign ground
//!
//! Fractional coefficients are applied in exact integer tenths so the
//! result never depends on float rounding.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::events::{CaptureSource, SimEvent, UnitTag};
use crate::factions::FactionId;
use crate::grid::{Grid, Tile, TileOwner, CAPTURE_THRESHOLD};
use crate::math::{round_tenths, Fixed, Position};
use crate::units::Unit;

/// Minimum damage floor - attacks always deal at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Bound of the perturbation added to the attacker's attack value.
pub const ATTACK_JITTER: i32 = 2;

/// Bound of the perturbation added to the final damage.
pub const DAMAGE_JITTER: i32 = 1;

/// Defense coefficient in tenths (`def * 0.6`).
const DEFENSE_WEIGHT_TENTHS: i64 = 6;

/// The random part of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatRoll {
    /// Added to the attacker's attack value, in `[-2, 2]`.
    pub attack_jitter: i32,
    /// Added to the damage before rounding, in `[-1, 1]`.
    pub damage_jitter: i32,
}

impl CombatRoll {
    /// No perturbation.
    pub const ZERO: Self = Self {
        attack_jitter: 0,
        damage_jitter: 0,
    };

    /// Draw both jitter terms from `rng`.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            attack_jitter: rng.gen_range(-ATTACK_JITTER..=ATTACK_JITTER),
            damage_jitter: rng.gen_range(-DAMAGE_JITTER..=DAMAGE_JITTER),
        }
    }
}

/// Effective attack: `base_atk + jitter + floor(level * 0.5)`.
#[must_use]
pub fn attack_value(attacker: &Unit, attack_jitter: i32) -> i32 {
    attacker.stats().base_atk + attack_jitter + attacker.level() as i32 / 2
}

/// Effective defense: `base_def + floor(level * 0.4)`.
#[must_use]
pub fn defense_value(defender: &Unit) -> i32 {
    defender.stats().base_def + defender.level() as i32 * 4 / 10
}

/// Damage dealt by `attacker` to `defender` for a given roll.
///
/// `max(1, round(atk - def * 0.6 + damage_jitter))`
#[must_use]
pub fn calculate_damage(attacker: &Unit, defender: &Unit, roll: CombatRoll) -> u32 {
    let atk = i64::from(attack_value(attacker, roll.attack_jitter));
    let def = i64::from(defense_value(defender));
    let tenths = (atk + i64::from(roll.damage_jitter)) * 10 - def * DEFENSE_WEIGHT_TENTHS;
    let damage = round_tenths(tenths).max(i64::from(MIN_DAMAGE));
    u32::try_from(damage).unwrap_or(u32::MAX)
}

/// Result of adding capture progress to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Progress after the addition. Zero if the tile flipped.
    pub progress: Fixed,
    /// Previous owner, if the tile changed hands.
    pub flipped_from: Option<TileOwner>,
}

/// Add `rate` progress to `tile` on behalf of `faction`.
///
/// Reaching [`CAPTURE_THRESHOLD`] hands the tile to `faction` and resets
/// progress to exactly zero, so progress never rests at or above the
/// threshold.
pub fn apply_capture(tile: &mut Tile, faction: FactionId, rate: u32) -> CaptureOutcome {
    let progress = tile.capture_progress() + Fixed::from_num(rate);
    if progress >= Fixed::from_num(CAPTURE_THRESHOLD) {
        let previous = tile.owner();
        tile.flip_to(TileOwner::Faction(faction));
        CaptureOutcome {
            progress: Fixed::ZERO,
            flipped_from: Some(previous),
        }
    } else {
        tile.set_progress(progress);
        CaptureOutcome {
            progress,
            flipped_from: None,
        }
    }
}

/// Apply capture pressure from `unit` to the tile at `position`, recording
/// the progress and any ownership flip.
///
/// Does nothing if `position` is off the board.
pub fn capture_tile(
    grid: &mut Grid,
    position: Position,
    unit: UnitTag,
    rate: u32,
    source: CaptureSource,
    turn: u32,
    events: &mut Vec<SimEvent>,
) {
    let Some(tile) = grid.tile_mut(position) else {
        return;
    };

    let outcome = apply_capture(tile, unit.faction, rate);
    events.push(SimEvent::Capture {
        turn,
        unit,
        position,
        gained: rate,
        progress: outcome.progress,
        source,
    });

    if let Some(from) = outcome.flipped_from {
        events.push(SimEvent::TileFlipped {
            turn,
            position,
            from,
            to: unit.faction,
            by: unit,
        });
    }
}

/// Resolve one attack: apply damage and, on a kill, the capture bonus.
///
/// The bonus goes to the tile the defender died on when that tile is not
/// already held by the attacker's faction.
pub fn resolve_attack(
    attacker: &Unit,
    defender: &mut Unit,
    grid: &mut Grid,
    roll: CombatRoll,
    turn: u32,
    events: &mut Vec<SimEvent>,
) -> u32 {
    let damage = calculate_damage(attacker, defender, roll);
    let killed = defender.apply_damage(damage);

    let attacker_tag = UnitTag::from(attacker);
    let defender_tag = UnitTag::from(&*defender);
    events.push(SimEvent::Attack {
        turn,
        attacker: attacker_tag,
        defender: defender_tag,
        damage,
        hp_left: defender.hp(),
        max_hp: defender.max_hp(),
    });

    if killed {
        let position = defender.position();
        events.push(SimEvent::Kill {
            turn,
            attacker: attacker_tag,
            defender: defender_tag,
            position,
        });

        let foreign = grid
            .tile(position)
            .is_some_and(|tile| !tile.owner().is(attacker.faction()));
        if foreign {
            capture_tile(
                grid,
                position,
                attacker_tag,
                attacker.capture_rate(),
                CaptureSource::KillBonus,
                turn,
                events,
            );
        }
    }

    damage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit(faction: FactionId, kind: UnitKind, level: u32, x: i32, y: i32) -> Unit {
        Unit::new(1, faction, kind, level, Position::new(x, y))
    }

    #[test]
    fn test_level_one_damage_without_jitter() {
        let a = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let b = unit(FactionId::B, UnitKind::Infantry, 1, 1, 0);
        // atk = 7 + 0 = 7, def = 4 + 0 = 4, 7 - 2.4 = 4.6 -> 5
        assert_eq!(attack_value(&a, 0), 7);
        assert_eq!(defense_value(&b), 4);
        assert_eq!(calculate_damage(&a, &b, CombatRoll::ZERO), 5);
    }

    #[test]
    fn test_level_ten_damage_without_jitter() {
        let a = unit(FactionId::A, UnitKind::Tank, 10, 0, 0);
        let b = unit(FactionId::B, UnitKind::Infantry, 10, 1, 0);
        // atk = 21 + 5 = 26, def = 15 + 4 = 19, 26 - 11.4 = 14.6 -> 15
        assert_eq!(calculate_damage(&a, &b, CombatRoll::ZERO), 15);
    }

    #[test]
    fn test_jitter_shifts_damage() {
        let a = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let b = unit(FactionId::B, UnitKind::Infantry, 1, 1, 0);
        let worst = CombatRoll {
            attack_jitter: -2,
            damage_jitter: -1,
        };
        let best = CombatRoll {
            attack_jitter: 2,
            damage_jitter: 1,
        };
        // 7 - 2 - 1 - 2.4 = 1.6 -> 2; 7 + 2 + 1 - 2.4 = 7.6 -> 8
        assert_eq!(calculate_damage(&a, &b, worst), 2);
        assert_eq!(calculate_damage(&a, &b, best), 8);
    }

    #[test]
    fn test_damage_floor() {
        let weak = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let strong = unit(FactionId::B, UnitKind::Infantry, 10, 1, 0);
        let roll = CombatRoll {
            attack_jitter: -2,
            damage_jitter: -1,
        };
        // 7 - 2 - 1 - 19 * 0.6 is far below zero
        assert_eq!(calculate_damage(&weak, &strong, roll), MIN_DAMAGE);
    }

    #[test]
    fn test_rolls_stay_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            let roll = CombatRoll::roll(&mut rng);
            assert!((-ATTACK_JITTER..=ATTACK_JITTER).contains(&roll.attack_jitter));
            assert!((-DAMAGE_JITTER..=DAMAGE_JITTER).contains(&roll.damage_jitter));
        }
    }

    #[test]
    fn test_capture_accumulates_below_threshold() {
        let mut grid = Grid::new(4, 4).unwrap();
        let tile = grid.tile_mut(Position::new(1, 1)).unwrap();
        let outcome = apply_capture(tile, FactionId::A, 12);
        assert_eq!(outcome.progress, Fixed::from_num(12));
        assert_eq!(outcome.flipped_from, None);
        assert_eq!(tile.owner(), TileOwner::Neutral);
    }

    #[test]
    fn test_capture_at_99_plus_4_flips_to_zero() {
        let mut grid = Grid::new(4, 4).unwrap();
        let tile = grid.tile_mut(Position::new(1, 1)).unwrap();
        tile.set_progress(Fixed::from_num(99));

        let outcome = apply_capture(tile, FactionId::B, 4);

        assert_eq!(outcome.flipped_from, Some(TileOwner::Neutral));
        assert_eq!(tile.owner(), TileOwner::Faction(FactionId::B));
        assert_eq!(tile.capture_progress(), Fixed::ZERO);
    }

    #[test]
    fn test_capture_exactly_at_threshold_flips() {
        let mut grid = Grid::new(4, 4).unwrap();
        let tile = grid.tile_mut(Position::new(0, 0)).unwrap();
        tile.set_progress(Fixed::from_num(88));
        let outcome = apply_capture(tile, FactionId::A, 12);
        assert!(outcome.flipped_from.is_some());
        assert_eq!(tile.capture_progress(), Fixed::ZERO);
    }

    #[test]
    fn test_kill_on_enemy_tile_grants_capture_rate() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.tile_mut(Position::new(1, 0))
            .unwrap()
            .flip_to(TileOwner::Faction(FactionId::B));

        let attacker = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let mut defender = unit(FactionId::B, UnitKind::Infantry, 1, 1, 0);
        defender.set_hp(5);

        let mut events = Vec::new();
        let roll = CombatRoll {
            attack_jitter: 2,
            damage_jitter: 1,
        };
        let damage = resolve_attack(&attacker, &mut defender, &mut grid, roll, 1, &mut events);

        assert_eq!(damage, 8);
        assert_eq!(defender.hp(), -3);
        assert!(!defender.is_alive());

        let tile = grid.tile(Position::new(1, 0)).unwrap();
        assert_eq!(tile.capture_progress(), Fixed::from_num(attacker.capture_rate()));
        assert_eq!(tile.owner(), TileOwner::Faction(FactionId::B));

        assert!(matches!(events[0], SimEvent::Attack { damage: 8, hp_left: -3, .. }));
        assert!(matches!(events[1], SimEvent::Kill { .. }));
        assert!(matches!(
            events[2],
            SimEvent::Capture {
                gained: 4,
                source: CaptureSource::KillBonus,
                ..
            }
        ));
    }

    #[test]
    fn test_kill_on_own_tile_grants_nothing() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.tile_mut(Position::new(1, 0))
            .unwrap()
            .flip_to(TileOwner::Faction(FactionId::A));

        let attacker = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let mut defender = unit(FactionId::B, UnitKind::Infantry, 1, 1, 0);
        defender.set_hp(1);

        let mut events = Vec::new();
        resolve_attack(&attacker, &mut defender, &mut grid, CombatRoll::ZERO, 1, &mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(grid.tile(Position::new(1, 0)).unwrap().capture_progress(), Fixed::ZERO);
    }

    #[test]
    fn test_non_lethal_hit_records_remaining_hp() {
        let mut grid = Grid::new(4, 4).unwrap();
        let attacker = unit(FactionId::A, UnitKind::Infantry, 1, 0, 0);
        let mut defender = unit(FactionId::B, UnitKind::Infantry, 1, 1, 0);

        let mut events = Vec::new();
        resolve_attack(&attacker, &mut defender, &mut grid, CombatRoll::ZERO, 3, &mut events);

        assert_eq!(defender.hp(), 20);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].to_string(),
            "[T3] A#1 infantry attacks B#1 infantry for 5 damage (hp 20/25)"
        );
    }
}
