//! Per-unit decision policy.
//!
//! Each living unit picks exactly one action per turn, evaluated fresh
//! against the current board in strict priority order:
//!
//! 1. **Attack** the first adjacent enemy
//! 2. **Capture** the tile underfoot if it is not already ours
//! 3. **Move** one step toward the nearest enemy, neutral tile or enemy base
//! 4. **Idle** when no step is possible
//!
//! Ties are always resolved by iteration order (neighbor order, then
//! roster order, then row-major tile order), never by randomness.

use serde::{Deserialize, Serialize};

use crate::factions::Factions;
use crate::grid::{Grid, TileOwner};
use crate::math::Position;
use crate::units::{Unit, UnitId};

/// The action chosen for a unit this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Strike an adjacent enemy unit.
    Attack {
        /// Enemy unit to strike.
        target: UnitId,
    },
    /// Add capture progress to the tile the unit stands on.
    Capture,
    /// Step to an adjacent cell.
    Move {
        /// Destination cell.
        to: Position,
    },
    /// No attack, capture or useful step is available.
    Idle,
}

/// What a moving unit is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTarget {
    /// The nearest living enemy unit.
    Enemy {
        /// Enemy unit id.
        unit: UnitId,
        /// Where it stands.
        position: Position,
    },
    /// The nearest unclaimed tile.
    NeutralTile(Position),
    /// The opposing base, when nothing else is left.
    EnemyBase(Position),
}

impl MoveTarget {
    /// Cell to move toward.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Enemy { position, .. } => *position,
            Self::NeutralTile(position) | Self::EnemyBase(position) => *position,
        }
    }
}

/// Choose `unit`'s action for this turn.
#[must_use]
pub fn decide(unit: &Unit, grid: &Grid, factions: &Factions) -> Action {
    if let Some(target) = adjacent_enemy(unit, grid, factions) {
        return Action::Attack { target };
    }

    let on_foreign_tile = grid
        .tile(unit.position())
        .is_some_and(|tile| !tile.owner().is(unit.faction()));
    if on_foreign_tile {
        return Action::Capture;
    }

    let target = move_target(unit, grid, factions);
    match step_toward(grid, unit.position(), target.position()) {
        Some(to) => Action::Move { to },
        None => Action::Idle,
    }
}

/// First living enemy on an orthogonally adjacent cell.
///
/// Neighbors are scanned in grid order (right, left, down, up); for each
/// neighbor the enemy roster is scanned in spawn order.
#[must_use]
pub fn adjacent_enemy(unit: &Unit, grid: &Grid, factions: &Factions) -> Option<UnitId> {
    let enemy = factions.enemy_of(unit.faction());
    grid.neighbors(unit.position()).into_iter().find_map(|cell| {
        enemy
            .alive_units()
            .find(|other| other.position() == cell)
            .map(Unit::id)
    })
}

/// Pick the movement goal: nearest living enemy, else nearest neutral
/// tile, else the enemy base.
#[must_use]
pub fn move_target(unit: &Unit, grid: &Grid, factions: &Factions) -> MoveTarget {
    let origin = unit.position();
    let enemy = factions.enemy_of(unit.faction());

    let nearest_enemy = nearest_by_distance(origin, enemy.alive_units(), Unit::position);
    if let Some(target) = nearest_enemy {
        return MoveTarget::Enemy {
            unit: target.id(),
            position: target.position(),
        };
    }

    let neutral = grid
        .tiles()
        .filter(|tile| tile.owner() == TileOwner::Neutral);
    if let Some(tile) = nearest_by_distance(origin, neutral, |tile| tile.position()) {
        return MoveTarget::NeutralTile(tile.position());
    }

    MoveTarget::EnemyBase(enemy.base())
}

/// First item at the minimum Manhattan distance from `origin`.
fn nearest_by_distance<'a, T: 'a>(
    origin: Position,
    items: impl Iterator<Item = &'a T>,
    position: impl Fn(&T) -> Position,
) -> Option<&'a T> {
    let mut best: Option<(&T, u32)> = None;
    for item in items {
        let distance = origin.manhattan_distance(position(item));
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((item, distance));
        }
    }
    best.map(|(item, _)| item)
}

/// One orthogonal step from `from` toward `target`.
///
/// The axis with the strictly larger distance is tried first; on a tie
/// the vertical axis goes first. A step along an axis with no distance to
/// cover, or one that leaves the grid, is skipped in favor of the other
/// axis. Returns `None` if neither axis yields a step.
#[must_use]
pub fn step_toward(grid: &Grid, from: Position, target: Position) -> Option<Position> {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    let horizontal = (dx != 0).then(|| from.offset(dx.signum(), 0));
    let vertical = (dy != 0).then(|| from.offset(0, dy.signum()));

    let (preferred, fallback) = if dx.abs() > dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };

    [preferred, fallback]
        .into_iter()
        .flatten()
        .find(|step| grid.in_bounds(*step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::{Faction, FactionId};
    use crate::units::UnitKind;

    struct Board {
        grid: Grid,
        factions: Factions,
        next_id: UnitId,
    }

    impl Board {
        fn new(width: u32, height: u32) -> Self {
            let mut grid = Grid::new(width, height).unwrap();
            let base_a = Position::new(0, height as i32 / 2);
            let base_b = Position::new(width as i32 - 1, height as i32 / 2);
            grid.tile_mut(base_a).unwrap().make_base(FactionId::A);
            grid.tile_mut(base_b).unwrap().make_base(FactionId::B);
            Self {
                grid,
                factions: Factions::new(
                    Faction::new(FactionId::A, base_a),
                    Faction::new(FactionId::B, base_b),
                ),
                next_id: 1,
            }
        }

        fn add(&mut self, faction: FactionId, x: i32, y: i32) -> UnitId {
            let id = self.next_id;
            self.next_id += 1;
            let unit = Unit::new(id, faction, UnitKind::Infantry, 1, Position::new(x, y));
            self.factions.get_mut(faction).push_unit(unit);
            id
        }

        fn claim(&mut self, faction: FactionId, x: i32, y: i32) {
            self.grid
                .tile_mut(Position::new(x, y))
                .unwrap()
                .flip_to(TileOwner::Faction(faction));
        }

        fn decide(&self, id: UnitId) -> Action {
            decide(self.factions.unit(id).unwrap(), &self.grid, &self.factions)
        }
    }

    #[test]
    fn test_attack_beats_capture() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        let enemy = board.add(FactionId::B, 4, 3);
        // Standing on neutral ground, but an enemy is adjacent
        assert_eq!(board.decide(me), Action::Attack { target: enemy });
    }

    #[test]
    fn test_attack_follows_neighbor_order() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        let _up = board.add(FactionId::B, 4, 3);
        let left = board.add(FactionId::B, 3, 4);
        // Left is scanned before up
        assert_eq!(board.decide(me), Action::Attack { target: left });
    }

    #[test]
    fn test_dead_neighbors_are_ignored() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        let dead = board.add(FactionId::B, 5, 4);
        board
            .factions
            .get_mut(FactionId::B)
            .unit_mut(dead)
            .unwrap()
            .set_hp(0);
        assert_eq!(board.decide(me), Action::Capture);
    }

    #[test]
    fn test_diagonal_enemy_is_not_adjacent() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        board.add(FactionId::B, 5, 5);
        board.claim(FactionId::A, 4, 4);
        assert_eq!(
            board.decide(me),
            Action::Move {
                to: Position::new(4, 5)
            }
        );
    }

    #[test]
    fn test_capture_on_enemy_tile() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 6, 2);
        board.add(FactionId::B, 9, 4);
        board.claim(FactionId::B, 6, 2);
        assert_eq!(board.decide(me), Action::Capture);
    }

    #[test]
    fn test_base_units_move_toward_enemy() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 0, 4);
        board.add(FactionId::B, 9, 4);
        assert_eq!(
            board.decide(me),
            Action::Move {
                to: Position::new(1, 4)
            }
        );
    }

    #[test]
    fn test_nearest_enemy_first_on_tie() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        board.claim(FactionId::A, 4, 4);
        let first = board.add(FactionId::B, 7, 4);
        board.add(FactionId::B, 4, 1);
        let unit = board.factions.unit(me).unwrap();
        assert_eq!(
            move_target(unit, &board.grid, &board.factions),
            MoveTarget::Enemy {
                unit: first,
                position: Position::new(7, 4)
            }
        );
    }

    #[test]
    fn test_neutral_tile_when_no_enemies() {
        let mut board = Board::new(3, 2);
        let me = board.add(FactionId::A, 0, 1);
        let unit = board.factions.unit(me).unwrap();
        // Row-major scan: (0,0) and (1,1) are both at distance 1, (0,0) comes first
        assert_eq!(
            move_target(unit, &board.grid, &board.factions),
            MoveTarget::NeutralTile(Position::new(0, 0))
        );
    }

    #[test]
    fn test_enemy_base_when_nothing_else() {
        let mut board = Board::new(2, 1);
        let me = board.add(FactionId::A, 0, 0);
        let unit = board.factions.unit(me).unwrap();
        assert_eq!(
            move_target(unit, &board.grid, &board.factions),
            MoveTarget::EnemyBase(Position::new(1, 0))
        );
    }

    #[test]
    fn test_step_prefers_larger_axis() {
        let grid = Grid::new(10, 8).unwrap();
        let from = Position::new(2, 2);
        assert_eq!(step_toward(&grid, from, Position::new(7, 4)), Some(Position::new(3, 2)));
        assert_eq!(step_toward(&grid, from, Position::new(3, 6)), Some(Position::new(2, 3)));
        // Equal distances go vertical first
        assert_eq!(step_toward(&grid, from, Position::new(0, 0)), Some(Position::new(2, 1)));
    }

    #[test]
    fn test_step_on_shared_row_or_column() {
        let grid = Grid::new(10, 8).unwrap();
        let from = Position::new(5, 5);
        assert_eq!(step_toward(&grid, from, Position::new(5, 0)), Some(Position::new(5, 4)));
        assert_eq!(step_toward(&grid, from, Position::new(9, 5)), Some(Position::new(6, 5)));
    }

    #[test]
    fn test_no_step_onto_own_cell() {
        let grid = Grid::new(10, 8).unwrap();
        let from = Position::new(5, 5);
        assert_eq!(step_toward(&grid, from, from), None);
    }

    #[test]
    fn test_off_grid_target_falls_back_to_other_axis() {
        let grid = Grid::new(4, 4).unwrap();
        let from = Position::new(3, 1);
        // Horizontal step would leave the grid; fall back to vertical
        assert_eq!(step_toward(&grid, from, Position::new(9, 2)), Some(Position::new(3, 2)));
        assert_eq!(step_toward(&grid, from, Position::new(9, 1)), None);
    }

    #[test]
    fn test_stacked_enemy_idles() {
        let mut board = Board::new(10, 8);
        let me = board.add(FactionId::A, 4, 4);
        board.claim(FactionId::A, 4, 4);
        board.add(FactionId::B, 4, 4);
        assert_eq!(board.decide(me), Action::Idle);
    }
}
