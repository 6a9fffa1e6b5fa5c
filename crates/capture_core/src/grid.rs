//! The board: a fixed rectangle of tiles with bounds and neighbor queries.
//!
//! Out-of-bounds lookups are an ordinary outcome here. Movement and
//! adjacency checks probe past the edges constantly, so every query
//! returns an `Option` rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::factions::FactionId;
use crate::math::{fixed_serde, Fixed, Position};

/// Capture progress at which a tile changes hands.
pub const CAPTURE_THRESHOLD: u32 = 100;

/// Defense value of an ordinary tile.
pub const BASE_TILE_DEFENSE: u32 = 20;

/// Extra defense on a faction's base tile.
pub const HOME_TILE_DEFENSE_BONUS: u32 = 30;

/// Who holds a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileOwner {
    /// Unclaimed.
    #[default]
    Neutral,
    /// Held by a faction.
    Faction(FactionId),
}

impl TileOwner {
    /// Whether the tile is held by `faction`.
    #[must_use]
    pub fn is(self, faction: FactionId) -> bool {
        self == Self::Faction(faction)
    }
}

impl std::fmt::Display for TileOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neutral => f.write_str("neutral"),
            Self::Faction(id) => write!(f, "{id}"),
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    owner: TileOwner,
    defense: u32,
    #[serde(with = "fixed_serde")]
    capture_progress: Fixed,
}

impl Tile {
    fn new(position: Position) -> Self {
        Self {
            position,
            owner: TileOwner::Neutral,
            defense: BASE_TILE_DEFENSE,
            capture_progress: Fixed::ZERO,
        }
    }

    /// Cell coordinates.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> TileOwner {
        self.owner
    }

    /// Defense rating. Informational: no formula reads it.
    #[must_use]
    pub const fn defense(&self) -> u32 {
        self.defense
    }

    /// Accumulated capture progress, always in `[0, CAPTURE_THRESHOLD)`.
    #[must_use]
    pub const fn capture_progress(&self) -> Fixed {
        self.capture_progress
    }

    pub(crate) fn set_progress(&mut self, progress: Fixed) {
        self.capture_progress = progress;
    }

    /// Hand the tile to a new owner. Progress is cleared in the same step.
    pub(crate) fn flip_to(&mut self, owner: TileOwner) {
        self.owner = owner;
        self.capture_progress = Fixed::ZERO;
    }

    /// Make this tile a faction's home: owned and fortified.
    pub(crate) fn make_base(&mut self, faction: FactionId) {
        self.flip_to(TileOwner::Faction(faction));
        self.defense = BASE_TILE_DEFENSE + HOME_TILE_DEFENSE_BONUS;
    }
}

/// Tile counts per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileTally {
    /// Tiles held by faction A.
    pub faction_a: u32,
    /// Tiles held by faction B.
    pub faction_b: u32,
    /// Unclaimed tiles.
    pub neutral: u32,
}

impl TileTally {
    /// Tiles held by `faction`.
    #[must_use]
    pub const fn owned_by(&self, faction: FactionId) -> u32 {
        match faction {
            FactionId::A => self.faction_a,
            FactionId::B => self.faction_b,
        }
    }

    /// Sum over all owners.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.faction_a + self.faction_b + self.neutral
    }
}

/// Fixed-size board. Tiles are stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create an all-neutral grid.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidGrid`] if either dimension is zero or if
    /// the grid is too narrow to hold two distinct base tiles.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidGrid {
                width,
                height,
                reason: "dimensions must be positive",
            });
        }
        if width < 2 {
            return Err(GameError::InvalidGrid {
                width,
                height,
                reason: "width must be at least 2 to place both bases",
            });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(GameError::InvalidGrid {
                width,
                height,
                reason: "dimensions exceed the coordinate range",
            });
        }

        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(Position::new(x, y)));
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn tile_count(&self) -> u32 {
        self.width * self.height
    }

    /// Whether `pos` lies on the board.
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// The tile at `pos`, or `None` off the board.
    #[must_use]
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Mutable tile at `pos`, or `None` off the board.
    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.tiles[i])
    }

    /// In-bounds orthogonal neighbors in the fixed order right, left,
    /// down, up. Tie-breaks elsewhere depend on this order.
    #[must_use]
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(|(dx, dy)| pos.offset(dx, dy))
            .filter(|p| self.in_bounds(*p))
            .collect()
    }

    /// All tiles in row-major order (y outer, x inner).
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Count tiles held by `owner`.
    #[must_use]
    pub fn count_owned_by(&self, owner: TileOwner) -> u32 {
        self.tiles.iter().filter(|tile| tile.owner == owner).count() as u32
    }

    /// Tile counts for every owner in one pass.
    #[must_use]
    pub fn tally(&self) -> TileTally {
        let mut tally = TileTally::default();
        for tile in &self.tiles {
            match tile.owner {
                TileOwner::Neutral => tally.neutral += 1,
                TileOwner::Faction(FactionId::A) => tally.faction_a += 1,
                TileOwner::Faction(FactionId::B) => tally.faction_b += 1,
            }
        }
        tally
    }
}
