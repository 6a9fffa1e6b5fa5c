//! Roster generation from the difficulty level.
//!
//! Scaling is deliberately coarse: more levels mean more and stronger
//! units in steps of 10 and 15 levels. The curve is monotonic, not
//! balanced.

use crate::config::SimulationConfig;
use crate::factions::Faction;
use crate::units::{Unit, UnitId, UnitKind};

/// Difficulty level from which the first roster slot is a scout.
pub const SCOUT_MIN_LEVEL: u32 = 10;

/// Difficulty level from which the second roster slot is a tank.
pub const TANK_MIN_LEVEL: u32 = 30;

/// Kind of the unit in roster slot `slot` at difficulty `level`.
#[must_use]
pub const fn kind_for_slot(slot: u32, level: u32) -> UnitKind {
    match slot {
        0 if level >= SCOUT_MIN_LEVEL => UnitKind::Scout,
        1 if level >= TANK_MIN_LEVEL => UnitKind::Tank,
        _ => UnitKind::Infantry,
    }
}

/// Fill `faction`'s roster, stacking every unit on its base tile.
///
/// Ids are drawn from `next_id`, which is left pointing past the last
/// id handed out.
pub fn spawn_roster(faction: &mut Faction, config: &SimulationConfig, next_id: &mut UnitId) {
    let level = config.clamped_level();
    let unit_level = config.unit_level();
    let base = faction.base();

    for slot in 0..config.roster_size() {
        let unit = Unit::new(
            *next_id,
            faction.id(),
            kind_for_slot(slot, level),
            unit_level,
            base,
        );
        *next_id += 1;
        faction.push_unit(unit);
    }

    tracing::debug!(
        faction = %faction.id(),
        units = faction.units().len(),
        unit_level,
        "Spawned roster"
    );
}
