//! Faction definitions and the fixed two-faction pairing.

use serde::{Deserialize, Serialize};

use crate::math::Position;
use crate::units::{Unit, UnitId};

/// Identifier for one of the two sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactionId {
    /// The western faction, based on the left edge. Acts first each turn.
    A,
    /// The eastern faction, based on the right edge.
    B,
}

impl FactionId {
    /// Both factions in turn order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::A => "Faction A",
            Self::B => "Faction B",
        }
    }

    /// Get the short name for this faction.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One side of the match: a roster of units and a fixed base.
///
/// Units are never removed. A dead unit stays in the roster in its spawn
/// slot so that iteration order is stable for the whole match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    id: FactionId,
    base: Position,
    units: Vec<Unit>,
}

impl Faction {
    /// Create a faction with an empty roster.
    #[must_use]
    pub fn new(id: FactionId, base: Position) -> Self {
        Self {
            id,
            base,
            units: Vec::new(),
        }
    }

    /// Faction identifier.
    #[must_use]
    pub const fn id(&self) -> FactionId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Base tile position. Fixed for the lifetime of the match.
    #[must_use]
    pub const fn base(&self) -> Position {
        self.base
    }

    /// Full roster in spawn order, dead units included.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Append a freshly spawned unit to the roster.
    pub(crate) fn push_unit(&mut self, unit: Unit) {
        debug_assert_eq!(unit.faction(), self.id);
        self.units.push(unit);
    }

    /// Living units in spawn order. Recomputed on every call.
    pub fn alive_units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter().filter(|unit| unit.is_alive())
    }

    /// Number of living units.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_units().count()
    }

    /// Ids of the units alive right now, in spawn order.
    #[must_use]
    pub fn alive_snapshot(&self) -> Vec<UnitId> {
        self.alive_units().map(Unit::id).collect()
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    /// Look up a unit by id for mutation.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }
}

/// The two factions of a match.
///
/// Modelled as a fixed pair so that "the enemy" is always well defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factions {
    a: Faction,
    b: Faction,
}

impl Factions {
    /// Pair up the two factions. Only the crate builds pairs, always A first.
    #[must_use]
    pub(crate) fn new(a: Faction, b: Faction) -> Self {
        debug_assert_eq!(a.id(), FactionId::A);
        debug_assert_eq!(b.id(), FactionId::B);
        Self { a, b }
    }

    /// Borrow a faction.
    #[must_use]
    pub const fn get(&self, id: FactionId) -> &Faction {
        match id {
            FactionId::A => &self.a,
            FactionId::B => &self.b,
        }
    }

    /// Borrow a faction mutably.
    pub fn get_mut(&mut self, id: FactionId) -> &mut Faction {
        match id {
            FactionId::A => &mut self.a,
            FactionId::B => &mut self.b,
        }
    }

    /// Borrow `id`'s faction and its opponent mutably at once.
    pub fn split_mut(&mut self, id: FactionId) -> (&mut Faction, &mut Faction) {
        match id {
            FactionId::A => (&mut self.a, &mut self.b),
            FactionId::B => (&mut self.b, &mut self.a),
        }
    }

    /// The opponent of `id`.
    #[must_use]
    pub const fn enemy_of(&self, id: FactionId) -> &Faction {
        self.get(id.opponent())
    }

    /// Both factions in turn order.
    pub fn iter(&self) -> impl Iterator<Item = &Faction> {
        [&self.a, &self.b].into_iter()
    }

    /// Find a unit in either roster.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.a.unit(id).or_else(|| self.b.unit(id))
    }
}
