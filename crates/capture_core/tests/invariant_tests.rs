//! Property tests over random configurations.

use capture_core::prelude::*;
use capture_test_utils::determinism::strategies::{arb_config, arb_deterministic_config};
use capture_test_utils::fixtures::simulation;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn capture_progress_stays_below_threshold(config in arb_config()) {
        let mut sim = simulation(config);
        let threshold = Fixed::from_num(CAPTURE_THRESHOLD);
        while !sim.is_finished() {
            sim.step();
            for tile in sim.grid().tiles() {
                prop_assert!(tile.capture_progress() >= Fixed::ZERO);
                prop_assert!(tile.capture_progress() < threshold);
            }
        }
    }

    #[test]
    fn flips_reset_progress(config in arb_config()) {
        let mut sim = simulation(config);
        while !sim.is_finished() {
            let turn = sim.step();
            for event in &turn.events {
                if let SimEvent::Capture { progress, .. } = event {
                    prop_assert!(*progress < Fixed::from_num(CAPTURE_THRESHOLD));
                }
            }
            // A flip is always the last event of its capture pair.
            for pair in turn.events.windows(2) {
                if let SimEvent::TileFlipped { position, .. } = &pair[1] {
                    let SimEvent::Capture { position: captured, progress, .. } = &pair[0] else {
                        return Err(TestCaseError::fail("flip without a capture"));
                    };
                    prop_assert_eq!(captured, position);
                    prop_assert_eq!(*progress, Fixed::ZERO);
                }
            }
        }
    }

    #[test]
    fn hp_never_exceeds_max(config in arb_config()) {
        let mut sim = simulation(config);
        while !sim.is_finished() {
            sim.step();
            for faction in sim.factions().iter() {
                for unit in faction.units() {
                    prop_assert!(unit.hp() <= unit.max_hp());
                }
            }
        }
    }

    #[test]
    fn terminates_within_cap(config in arb_config()) {
        let mut sim = simulation(config);
        let outcome = sim.run();
        prop_assert!(outcome.turns <= config.max_turns());
        prop_assert_eq!(outcome.tiles.total(), sim.grid().tile_count());
    }

    #[test]
    fn tally_sums_to_tile_count(config in arb_config()) {
        let mut sim = simulation(config);
        while !sim.is_finished() {
            sim.step();
            prop_assert_eq!(sim.grid().tally().total(), config.width * config.height);
        }
    }

    #[test]
    fn deterministic_configs_replay(config in arb_deterministic_config()) {
        let first = simulation(config).run();
        let second = simulation(config).run();
        prop_assert_eq!(first.log, second.log);
    }
}
