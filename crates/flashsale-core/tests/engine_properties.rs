//! Property-style sweeps over randomized runs of the simulation engine.
//!
//! Each test drives the engine with many seeded sources and checks the
//! invariants that must hold in every reachable state.

#![allow(clippy::unwrap_used)]

use flashsale_core::config::StoreConfig;
use flashsale_core::engine::{EVENT_LOG_CAPACITY, SimulationEngine};
use flashsale_core::random::{RandomSource, RngSource};
use flashsale_types::{ActionKind, Severity};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const SEEDS: u64 = 64;
const TICKS_PER_RUN: usize = 120;

fn fresh_engine() -> SimulationEngine {
    SimulationEngine::new(&StoreConfig::default()).unwrap()
}

#[test]
fn event_log_never_exceeds_capacity() {
    for seed in 0..SEEDS {
        let mut engine = fresh_engine();
        let mut source = RngSource::seeded(seed);
        for _ in 0..TICKS_PER_RUN {
            engine.advance(&mut source);
            assert!(engine.events().len() <= EVENT_LOG_CAPACITY);
        }
        assert_eq!(engine.events().len(), EVENT_LOG_CAPACITY);
    }
}

#[test]
fn waitlists_never_decrease_and_stock_only_falls() {
    for seed in 0..SEEDS {
        let mut engine = fresh_engine();
        let mut source = RngSource::new(SmallRng::seed_from_u64(seed));
        let mut previous = engine.snapshot().regions;

        for _ in 0..TICKS_PER_RUN {
            engine.advance(&mut source);
            let current = engine.snapshot().regions;
            for (before, after) in previous.iter().zip(&current) {
                assert_eq!(before.name, after.name);
                assert!(after.waitlist_count >= before.waitlist_count);
                assert!(after.inventory_units <= before.inventory_units);
            }
            previous = current;
        }
    }
}

#[test]
fn only_sold_out_purchases_are_critical() {
    for seed in 0..SEEDS {
        let mut engine = fresh_engine();
        let mut source = RngSource::seeded(seed);
        for _ in 0..TICKS_PER_RUN {
            let before = engine.snapshot();
            let event = engine.advance(&mut source).unwrap();
            let region_before = before.region(&event.region).unwrap();

            match event.severity {
                Severity::Critical => {
                    assert_eq!(event.action, ActionKind::Purchase);
                    assert_eq!(region_before.inventory_units, 0);
                }
                Severity::Alert => {
                    assert_eq!(event.action, ActionKind::Purchase);
                    assert!(region_before.inventory_units <= 2);
                    assert!(region_before.inventory_units > 0);
                }
                Severity::Info => {
                    if event.action == ActionKind::Purchase {
                        assert!(region_before.inventory_units > 2);
                    }
                }
            }
        }
    }
}

#[test]
fn every_unit_is_accounted_for() {
    // Purchases either consume a unit or join a waitlist, so
    // sold + waitlisted == purchases across the whole run.
    for seed in 0..SEEDS {
        let mut engine = fresh_engine();
        let mut source = RngSource::seeded(seed);
        let starting = engine.snapshot().total_inventory();
        let mut purchases: u64 = 0;

        for _ in 0..TICKS_PER_RUN {
            let event = engine.advance(&mut source).unwrap();
            if event.action == ActionKind::Purchase {
                purchases += 1;
            }
        }

        let snap = engine.snapshot();
        let sold = starting - snap.total_inventory();
        assert_eq!(sold + snap.total_waitlist(), purchases);
    }
}

#[test]
fn every_region_and_action_is_drawn() {
    let mut engine = fresh_engine();
    let mut source = RngSource::seeded(2024);
    let mut regions = std::collections::BTreeSet::new();
    let mut actions = std::collections::BTreeSet::new();

    for _ in 0..400 {
        let event = engine.advance(&mut source).unwrap();
        regions.insert(event.region);
        actions.insert(event.action);
    }

    assert_eq!(regions.len(), 4);
    assert_eq!(actions.len(), ActionKind::ALL.len());
}

#[test]
fn custom_source_is_honored() {
    // A source that always picks the last region and the last action.
    struct LastAlways;
    impl RandomSource for LastAlways {
        fn index(&mut self, len: usize) -> usize {
            len.saturating_sub(1)
        }
        fn between(&mut self, _low: u32, high: u32) -> u32 {
            high
        }
    }

    let mut engine = fresh_engine();
    let event = engine.advance(&mut LastAlways).unwrap();
    assert_eq!(event.region, "West");
    assert_eq!(event.action, ActionKind::Purchase);
    assert_eq!(event.user_id.get(), 999);
    assert_eq!(engine.region("West").unwrap().inventory_units, 4);
}
