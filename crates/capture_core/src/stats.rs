//! Per-faction match statistics derived from the event stream.

use serde::{Deserialize, Serialize};

use crate::events::{CaptureSource, SimEvent};
use crate::factions::FactionId;

/// Counters for one faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FactionStats {
    /// Attacks made.
    pub attacks: u32,
    /// Total damage dealt.
    pub damage_dealt: u64,
    /// Enemy units destroyed.
    pub kills: u32,
    /// Capture actions taken.
    pub capture_actions: u32,
    /// Kill bonuses applied to foreign tiles.
    pub kill_bonuses: u32,
    /// Tiles flipped to this faction.
    pub tiles_captured: u32,
}

/// Statistics for both factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    /// Faction A counters.
    pub faction_a: FactionStats,
    /// Faction B counters.
    pub faction_b: FactionStats,
}

impl MatchStats {
    /// Tally a sequence of events.
    #[must_use]
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a SimEvent>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.record(event);
        }
        stats
    }

    /// Counters for `faction`.
    #[must_use]
    pub const fn get(&self, faction: FactionId) -> &FactionStats {
        match faction {
            FactionId::A => &self.faction_a,
            FactionId::B => &self.faction_b,
        }
    }

    fn get_mut(&mut self, faction: FactionId) -> &mut FactionStats {
        match faction {
            FactionId::A => &mut self.faction_a,
            FactionId::B => &mut self.faction_b,
        }
    }

    /// Fold one event into the counters.
    pub fn record(&mut self, event: &SimEvent) {
        let entry = self.get_mut(event.actor_faction());
        match event {
            SimEvent::Attack { damage, .. } => {
                entry.attacks += 1;
                entry.damage_dealt += u64::from(*damage);
            }
            SimEvent::Kill { .. } => entry.kills += 1,
            SimEvent::Capture { source, .. } => match source {
                CaptureSource::Action => entry.capture_actions += 1,
                CaptureSource::KillBonus => entry.kill_bonuses += 1,
            },
            SimEvent::TileFlipped { .. } => entry.tiles_captured += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::UnitTag;
    use crate::grid::TileOwner;
    use crate::math::{Fixed, Position};
    use crate::units::UnitKind;

    #[test]
    fn test_counts_by_actor() {
        let a = UnitTag {
            id: 1,
            faction: FactionId::A,
            kind: UnitKind::Infantry,
        };
        let b = UnitTag {
            id: 4,
            faction: FactionId::B,
            kind: UnitKind::Scout,
        };
        let events = vec![
            SimEvent::Attack {
                turn: 1,
                attacker: a,
                defender: b,
                damage: 5,
                hp_left: 20,
                max_hp: 25,
            },
            SimEvent::Attack {
                turn: 1,
                attacker: b,
                defender: a,
                damage: 3,
                hp_left: 22,
                max_hp: 25,
            },
            SimEvent::Capture {
                turn: 2,
                unit: b,
                position: Position::new(5, 4),
                gained: 9,
                progress: Fixed::ZERO,
                source: CaptureSource::Action,
            },
            SimEvent::TileFlipped {
                turn: 2,
                position: Position::new(5, 4),
                from: TileOwner::Neutral,
                to: FactionId::B,
                by: b,
            },
        ];

        let stats = MatchStats::from_events(&events);
        assert_eq!(stats.get(FactionId::A).attacks, 1);
        assert_eq!(stats.get(FactionId::A).damage_dealt, 5);
        assert_eq!(stats.get(FactionId::B).damage_dealt, 3);
        assert_eq!(stats.get(FactionId::B).capture_actions, 1);
        assert_eq!(stats.get(FactionId::B).tiles_captured, 1);
        assert_eq!(stats.get(FactionId::A).tiles_captured, 0);
    }
}
