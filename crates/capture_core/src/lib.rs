//! # Capture Core
//!
//! Deterministic turn-based territory capture simulation.
//!
//! Two factions start on opposite edges of a grid, each with a roster
//! scaled by a difficulty level. Every turn each living unit attacks an
//! adjacent enemy, pushes capture progress on the tile it stands on, or
//! steps toward something worth taking. The match ends when a faction
//! holds most of the map, loses its base, or runs out of units.
//!
//! This crate contains **only** the simulation:
//! - No rendering
//! - No IO
//! - No system randomness (the generator is seeded and owned by the match)
//! - No floating-point math (capture progress is fixed-point, damage is integer tenths)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tiles, ownership and neighbor queries
//! - [`units`] / [`factions`] - Entity model
//! - [`spawn`] - Roster construction
//! - [`policy`] - Per-unit decisions
//! - [`combat`] - Damage and capture resolution
//! - [`systems`] - Turn scheduling and maintenance
//! - [`victory`] - End conditions and results
//! - [`simulation`] - Match driver

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod config;
pub mod error;
pub mod events;
pub mod factions;
pub mod grid;
pub mod math;
pub mod policy;
pub mod simulation;
pub mod spawn;
pub mod stats;
pub mod systems;
pub mod units;
pub mod victory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SimulationConfig;
    pub use crate::error::{GameError, Result};
    pub use crate::events::SimEvent;
    pub use crate::factions::{Faction, FactionId, Factions};
    pub use crate::grid::{Grid, Tile, TileOwner, TileTally, CAPTURE_THRESHOLD};
    pub use crate::math::{Fixed, Position};
    pub use crate::policy::Action;
    pub use crate::simulation::{MatchOutcome, Simulation, TurnEvents};
    pub use crate::stats::{FactionStats, MatchStats};
    pub use crate::units::{Unit, UnitId, UnitKind};
    pub use crate::victory::{EndCondition, MatchResult};
}
