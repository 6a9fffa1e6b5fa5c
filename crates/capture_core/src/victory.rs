//! Match termination and result labelling.
//!
//! Two separate questions are answered here:
//!
//! - [`check_victory`]: has the match ended, and why?
//! - [`MatchResult::from_tally`]: who is credited with the win?
//!
//! The result is always decided by tile count, even when the match ended
//! by base capture or elimination. A decisive base capture can therefore
//! be labelled a draw if both sides hold the same number of tiles. Both
//! answers are reported so callers can tell the two apart.

use serde::{Deserialize, Serialize};

use crate::factions::{FactionId, Factions};
use crate::grid::{Grid, TileOwner, TileTally};

/// Why a match stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndCondition {
    /// A faction holds strictly more than half of all tiles.
    TerritoryMajority {
        /// Majority holder.
        faction: FactionId,
    },
    /// A faction's base tile is held by its opponent.
    BaseCaptured {
        /// Faction whose base fell.
        base_of: FactionId,
    },
    /// A faction has no living units left.
    Eliminated {
        /// Faction that was wiped out.
        faction: FactionId,
    },
    /// Both factions lost their last units in the same turn.
    MutualElimination,
    /// The turn cap was reached with no other condition met.
    TurnLimit,
}

impl EndCondition {
    /// Faction this condition favors, if any.
    #[must_use]
    pub const fn favored(&self) -> Option<FactionId> {
        match self {
            Self::TerritoryMajority { faction } => Some(*faction),
            Self::BaseCaptured { base_of } => Some(base_of.opponent()),
            Self::Eliminated { faction } => Some(faction.opponent()),
            Self::MutualElimination | Self::TurnLimit => None,
        }
    }

    /// Short machine-friendly label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TerritoryMajority { .. } => "territory_majority",
            Self::BaseCaptured { .. } => "base_captured",
            Self::Eliminated { .. } => "eliminated",
            Self::MutualElimination => "mutual_elimination",
            Self::TurnLimit => "turn_limit",
        }
    }
}

impl std::fmt::Display for EndCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TerritoryMajority { faction } => {
                write!(f, "{} holds a territorial majority", faction.display_name())
            }
            Self::BaseCaptured { base_of } => {
                write!(f, "{} lost its base", base_of.display_name())
            }
            Self::Eliminated { faction } => {
                write!(f, "{} was eliminated", faction.display_name())
            }
            Self::MutualElimination => f.write_str("both factions were eliminated"),
            Self::TurnLimit => f.write_str("turn limit reached"),
        }
    }
}

/// Final result label of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    /// Faction A holds more tiles.
    FactionAWins,
    /// Faction B holds more tiles.
    FactionBWins,
    /// Equal tile counts.
    Draw,
}

impl MatchResult {
    /// Label by tile count: more tiles wins, equal counts draw.
    #[must_use]
    pub const fn from_tally(tally: &TileTally) -> Self {
        if tally.faction_a > tally.faction_b {
            Self::FactionAWins
        } else if tally.faction_b > tally.faction_a {
            Self::FactionBWins
        } else {
            Self::Draw
        }
    }

    /// Winning faction, or `None` for a draw.
    #[must_use]
    pub const fn winner(&self) -> Option<FactionId> {
        match self {
            Self::FactionAWins => Some(FactionId::A),
            Self::FactionBWins => Some(FactionId::B),
            Self::Draw => None,
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner() {
            Some(faction) => write!(f, "{} wins", faction.display_name()),
            None => f.write_str("Draw"),
        }
    }
}

/// Check every termination condition, factions in turn order.
///
/// Returns the first condition that fires, or `None` if play continues.
#[must_use]
pub fn check_victory(grid: &Grid, factions: &Factions) -> Option<EndCondition> {
    let tally = grid.tally();
    let total = grid.tile_count();

    for faction in factions.iter() {
        let id = faction.id();

        if tally.owned_by(id) * 2 > total {
            return Some(EndCondition::TerritoryMajority { faction: id });
        }

        let base_lost = grid
            .tile(faction.base())
            .is_some_and(|tile| tile.owner() == TileOwner::Faction(id.opponent()));
        if base_lost {
            return Some(EndCondition::BaseCaptured { base_of: id });
        }

        if faction.alive_count() == 0 {
            if factions.enemy_of(id).alive_count() == 0 {
                return Some(EndCondition::MutualElimination);
            }
            return Some(EndCondition::Eliminated { faction: id });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::Faction;
    use crate::math::Position;
    use crate::units::{Unit, UnitKind};

    fn setup() -> (Grid, Factions) {
        let mut grid = Grid::new(4, 2).unwrap();
        grid.tile_mut(Position::new(0, 1)).unwrap().make_base(FactionId::A);
        grid.tile_mut(Position::new(3, 1)).unwrap().make_base(FactionId::B);
        let mut a = Faction::new(FactionId::A, Position::new(0, 1));
        let mut b = Faction::new(FactionId::B, Position::new(3, 1));
        a.push_unit(Unit::new(1, FactionId::A, UnitKind::Infantry, 1, a.base()));
        b.push_unit(Unit::new(2, FactionId::B, UnitKind::Infantry, 1, b.base()));
        (grid, Factions::new(a, b))
    }

    fn give(grid: &mut Grid, faction: FactionId, cells: &[(i32, i32)]) {
        for &(x, y) in cells {
            grid.tile_mut(Position::new(x, y))
                .unwrap()
                .flip_to(TileOwner::Faction(faction));
        }
    }

    #[test]
    fn test_fresh_match_continues() {
        let (grid, factions) = setup();
        assert_eq!(check_victory(&grid, &factions), None);
    }

    #[test]
    fn test_exact_half_does_not_end() {
        let (mut grid, factions) = setup();
        // 4 of 8 tiles
        give(&mut grid, FactionId::A, &[(0, 0), (1, 0), (1, 1)]);
        assert_eq!(check_victory(&grid, &factions), None);
    }

    #[test]
    fn test_strict_majority_ends() {
        let (mut grid, factions) = setup();
        give(&mut grid, FactionId::B, &[(3, 0), (2, 0), (2, 1), (1, 0)]);
        assert_eq!(
            check_victory(&grid, &factions),
            Some(EndCondition::TerritoryMajority {
                faction: FactionId::B
            })
        );
    }

    #[test]
    fn test_base_capture_ends() {
        let (mut grid, factions) = setup();
        give(&mut grid, FactionId::A, &[(3, 1)]);
        let end = check_victory(&grid, &factions);
        assert_eq!(
            end,
            Some(EndCondition::BaseCaptured {
                base_of: FactionId::B
            })
        );
        assert_eq!(end.and_then(|e| e.favored()), Some(FactionId::A));
    }

    #[test]
    fn test_elimination() {
        let (grid, mut factions) = setup();
        factions.get_mut(FactionId::A).unit_mut(1).unwrap().set_hp(0);
        let end = check_victory(&grid, &factions);
        assert_eq!(
            end,
            Some(EndCondition::Eliminated {
                faction: FactionId::A
            })
        );
        assert_eq!(end.and_then(|e| e.favored()), Some(FactionId::B));
    }

    #[test]
    fn test_mutual_elimination() {
        let (grid, mut factions) = setup();
        factions.get_mut(FactionId::A).unit_mut(1).unwrap().set_hp(-2);
        factions.get_mut(FactionId::B).unit_mut(2).unwrap().set_hp(0);
        assert_eq!(
            check_victory(&grid, &factions),
            Some(EndCondition::MutualElimination)
        );
    }

    #[test]
    fn test_result_by_tile_count() {
        let tally = |a, b| TileTally {
            faction_a: a,
            faction_b: b,
            neutral: 0,
        };
        assert_eq!(MatchResult::from_tally(&tally(5, 3)), MatchResult::FactionAWins);
        assert_eq!(MatchResult::from_tally(&tally(2, 3)), MatchResult::FactionBWins);
        assert_eq!(MatchResult::from_tally(&tally(4, 4)), MatchResult::Draw);
    }

    #[test]
    fn test_base_capture_can_still_draw() {
        let (mut grid, factions) = setup();
        // A takes B's base while B holds two other tiles
        give(&mut grid, FactionId::A, &[(3, 1)]);
        give(&mut grid, FactionId::B, &[(2, 0), (2, 1)]);
        assert!(matches!(
            check_victory(&grid, &factions),
            Some(EndCondition::BaseCaptured { .. })
        ));
        assert_eq!(MatchResult::from_tally(&grid.tally()), MatchResult::Draw);
    }
}
