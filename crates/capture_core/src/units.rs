//! Unit kinds, derived stats and the unit record.
//!
//! All stats derive from a unit's level and kind at spawn time; nothing
//! but hit points and position changes afterwards.

use serde::{Deserialize, Serialize};

use crate::factions::FactionId;
use crate::math::Position;

/// Unique identifier for units. Assigned from 1 upward, never reused.
pub type UnitId = u32;

/// Highest unit level reachable from the difficulty scale.
pub const MAX_UNIT_LEVEL: u32 = 10;

/// Battlefield role of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitKind {
    /// Line unit.
    #[default]
    Infantry,
    /// Fast capturer.
    Scout,
    /// Heavy unit. Shares infantry stats; differs only in name and glyph.
    Tank,
}

impl UnitKind {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Infantry => "infantry",
            Self::Scout => "scout",
            Self::Tank => "tank",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stats derived from kind and level.
///
/// Fractional multipliers are applied with integer arithmetic and floor
/// division: `level * 1.5` becomes `level * 15 / 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Hit points at spawn.
    pub max_hp: i32,
    /// Base attack.
    pub base_atk: i32,
    /// Base defense.
    pub base_def: i32,
    /// Capture progress added per capture action.
    pub capture_rate: u32,
}

impl UnitStats {
    /// Compute the stats for a unit of `kind` at `level`.
    ///
    /// ```
    /// use capture_core::units::{UnitKind, UnitStats};
    ///
    /// let scout = UnitStats::derive(UnitKind::Scout, 10);
    /// assert_eq!(scout.capture_rate, 18);
    /// assert_eq!(scout.max_hp, 70);
    /// ```
    #[must_use]
    pub const fn derive(kind: UnitKind, level: u32) -> Self {
        let lvl = level as i32;
        let capture_rate = match kind {
            UnitKind::Scout => 8 + level,
            UnitKind::Infantry | UnitKind::Tank => 4 + level * 8 / 10,
        };
        Self {
            max_hp: 20 + lvl * 5,
            base_atk: 6 + lvl * 15 / 10,
            base_def: 3 + lvl * 12 / 10,
            capture_rate,
        }
    }
}

/// A single unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    faction: FactionId,
    kind: UnitKind,
    level: u32,
    position: Position,
    hp: i32,
    stats: UnitStats,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(id: UnitId, faction: FactionId, kind: UnitKind, level: u32, position: Position) -> Self {
        let level = level.clamp(1, MAX_UNIT_LEVEL);
        let stats = UnitStats::derive(kind, level);
        Self {
            id,
            faction,
            kind,
            level,
            position,
            hp: stats.max_hp,
            stats,
        }
    }

    /// Unit id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Owning faction.
    #[must_use]
    pub const fn faction(&self) -> FactionId {
        self.faction
    }

    /// Unit kind.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Unit level (1..=10).
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current hit points. Zero or negative once dead.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.stats.max_hp
    }

    /// Derived stats.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Capture progress added per capture action.
    #[must_use]
    pub const fn capture_rate(&self) -> u32 {
        self.stats.capture_rate
    }

    /// A unit is alive while its hit points are positive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtract damage. Returns `true` if this blow killed the unit.
    pub(crate) fn apply_damage(&mut self, damage: u32) -> bool {
        let was_alive = self.is_alive();
        self.hp = self.hp.saturating_sub(damage as i32);
        was_alive && !self.is_alive()
    }

    pub(crate) fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    #[cfg(test)]
    pub(crate) fn set_hp(&mut self, hp: i32) {
        self.hp = hp.min(self.stats.max_hp);
    }
}
