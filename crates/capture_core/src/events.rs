//! Typed match events and their log rendering.
//!
//! Every combat and capture outcome is recorded as a [`SimEvent`]. The
//! human-readable match log is the `Display` rendering of these events,
//! one line per event, so the two never disagree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::factions::FactionId;
use crate::grid::{TileOwner, CAPTURE_THRESHOLD};
use crate::math::{fixed_serde, Fixed, Position};
use crate::units::{Unit, UnitId, UnitKind};

/// Identity of a unit as it appears in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTag {
    /// Unit id.
    pub id: UnitId,
    /// Owning faction.
    pub faction: FactionId,
    /// Unit kind.
    pub kind: UnitKind,
}

impl From<&Unit> for UnitTag {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id(),
            faction: unit.faction(),
            kind: unit.kind(),
        }
    }
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} {}", self.faction, self.id, self.kind)
    }
}

/// What caused capture progress to be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureSource {
    /// The unit spent its action capturing the tile it stands on.
    Action,
    /// The unit killed a defender standing on the tile.
    KillBonus,
}

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A unit struck an adjacent enemy.
    Attack {
        /// Turn number (1-based).
        turn: u32,
        /// Attacking unit.
        attacker: UnitTag,
        /// Defending unit.
        defender: UnitTag,
        /// Damage dealt, at least 1.
        damage: u32,
        /// Defender hit points after the blow.
        hp_left: i32,
        /// Defender maximum hit points.
        max_hp: i32,
    },
    /// An attack reduced the defender to zero or fewer hit points.
    Kill {
        /// Turn number.
        turn: u32,
        /// Attacking unit.
        attacker: UnitTag,
        /// Unit that died.
        defender: UnitTag,
        /// Cell the defender died on.
        position: Position,
    },
    /// Capture progress was added to a tile.
    Capture {
        /// Turn number.
        turn: u32,
        /// Unit applying the pressure.
        unit: UnitTag,
        /// Tile being captured.
        position: Position,
        /// Progress added.
        gained: u32,
        /// Progress after the addition (zero if the tile flipped).
        #[serde(with = "fixed_serde")]
        progress: Fixed,
        /// Why progress was added.
        source: CaptureSource,
    },
    /// A tile changed hands.
    TileFlipped {
        /// Turn number.
        turn: u32,
        /// Tile that flipped.
        position: Position,
        /// Previous owner.
        from: TileOwner,
        /// New owner.
        to: FactionId,
        /// Unit whose progress completed the capture.
        by: UnitTag,
    },
}

impl SimEvent {
    /// Turn on which the event happened.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        match self {
            Self::Attack { turn, .. }
            | Self::Kill { turn, .. }
            | Self::Capture { turn, .. }
            | Self::TileFlipped { turn, .. } => *turn,
        }
    }

    /// Faction credited with the event.
    #[must_use]
    pub const fn actor_faction(&self) -> FactionId {
        match self {
            Self::Attack { attacker, .. } | Self::Kill { attacker, .. } => attacker.faction,
            Self::Capture { unit, .. } => unit.faction,
            Self::TileFlipped { to, .. } => *to,
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack {
                turn,
                attacker,
                defender,
                damage,
                hp_left,
                max_hp,
            } => write!(
                f,
                "[T{turn}] {attacker} attacks {defender} for {damage} damage (hp {hp_left}/{max_hp})"
            ),
            Self::Kill {
                turn,
                attacker,
                defender,
                position,
            } => write!(f, "[T{turn}] {attacker} destroys {defender} at {position}"),
            Self::Capture {
                turn,
                unit,
                position,
                gained,
                progress,
                source,
            } => {
                let verb = match source {
                    CaptureSource::Action => "captures",
                    CaptureSource::KillBonus => "pressures",
                };
                write!(
                    f,
                    "[T{turn}] {unit} {verb} {position} +{gained} ({progress}/{CAPTURE_THRESHOLD})"
                )
            }
            Self::TileFlipped {
                turn,
                position,
                from,
                to,
                by,
            } => write!(f, "[T{turn}] {position} falls to {to} from {from} ({by})"),
        }
    }
}
