//! Refresh loop with operator controls.
//!
//! [`run_simulation`] drives the engine at a fixed real-time cadence. Each
//! cycle it:
//!
//! 1. checks for a stop request and the wall-clock bound,
//! 2. locks the engine, calls `advance()` unless paused, takes a snapshot,
//!    and hands it to a [`TickCallback`] for rendering, all under the same
//!    lock,
//! 3. checks the tick bound, then sleeps for the current interval.
//!
//! Publishing under the lock orders every published snapshot with the
//! pause toggle, which takes the same lock.
//!
//! The pause flag is consulted once per cycle. A paused cycle still
//! publishes a snapshot so the dashboard keeps refreshing.

use std::sync::Arc;
use std::time::Duration;

use flashsale_types::{EngineSnapshot, Event};
use tracing::{info, warn};

use crate::engine::SharedEngine;
use crate::operator::{OperatorState, SimulationEndReason};
use crate::random::RandomSource;

/// What happened during one refresh cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based cycle counter (paused cycles included).
    pub cycle: u64,
    /// The event generated this cycle, or `None` if paused.
    pub event: Option<Event>,
    /// Engine state at the end of the cycle.
    pub snapshot: EngineSnapshot,
}

/// Result of the simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// The reason the loop ended.
    pub end_reason: SimulationEndReason,
    /// Total refresh cycles executed, paused ones included.
    pub total_cycles: u64,
    /// Cycles that actually advanced the engine.
    pub ticks_advanced: u64,
}

/// Callback invoked after each cycle.
///
/// The observer uses this to refresh its snapshot and push a broadcast to
/// connected clients.
pub trait TickCallback: Send {
    /// Called once per cycle while the engine lock is held.
    ///
    /// Must not block or wait on the engine.
    fn on_cycle(&mut self, report: &CycleReport);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_cycle(&mut self, _report: &CycleReport) {}
}

/// Run the refresh loop until a termination condition is met.
///
/// Ends on an operator stop, after `max_ticks` advanced ticks, or once
/// `max_real_time_seconds` have elapsed. With no bounds configured the loop
/// runs until stopped.
pub async fn run_simulation<R>(
    engine: &SharedEngine,
    source: &mut R,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> SimulationResult
where
    R: RandomSource + Send + ?Sized,
{
    let mut total_cycles: u64 = 0;
    let mut ticks_advanced: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return finish(operator, SimulationEndReason::OperatorStop, total_cycles, ticks_advanced)
                .await;
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                total_cycles,
                ticks_advanced,
            )
            .await;
        }

        // --- Advance, snapshot, and publish under one lock ---
        total_cycles = total_cycles.saturating_add(1);
        let report = {
            let mut guard = engine.lock().await;
            let event = guard.advance(source);
            let report = CycleReport {
                cycle: total_cycles,
                event,
                snapshot: guard.snapshot(),
            };
            callback.on_cycle(&report);
            report
        };

        if report.event.is_some() {
            ticks_advanced = ticks_advanced.saturating_add(1);
        }

        // --- Check tick limit (after tick) ---
        if report.event.is_some() && operator.tick_limit_reached(report.snapshot.tick) {
            info!(
                tick = report.snapshot.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                total_cycles,
                ticks_advanced,
            )
            .await;
        }

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

async fn finish(
    operator: &OperatorState,
    end_reason: SimulationEndReason,
    total_cycles: u64,
    ticks_advanced: u64,
) -> SimulationResult {
    operator.set_end_reason(end_reason).await;
    SimulationResult {
        end_reason,
        total_cycles,
        ticks_advanced,
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult, final_snapshot: &EngineSnapshot) {
    info!(
        reason = ?result.end_reason,
        total_cycles = result.total_cycles,
        ticks_advanced = result.ticks_advanced,
        "Simulation ended"
    );

    if result.ticks_advanced == 0 {
        warn!("Simulation ended with no ticks advanced");
        return;
    }

    for region in &final_snapshot.regions {
        info!(
            region = %region.name,
            inventory = region.inventory_units,
            waitlist = region.waitlist_count,
            "Final region state"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flashsale_types::{ActionKind, RegionState};

    use super::*;
    use crate::config::StoreConfig;
    use crate::engine::SimulationEngine;
    use crate::random::{RngSource, ScriptedSource};

    fn shared_default() -> SharedEngine {
        SimulationEngine::new(&StoreConfig::default())
            .unwrap()
            .into_shared()
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let engine = shared_default();
        let operator = Arc::new(OperatorState::with_bounds(0, 5, 0));
        let mut source = RngSource::seeded(42);

        let result = run_simulation(&engine, &mut source, &operator, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_cycles, 5);
        assert_eq!(result.ticks_advanced, 5);
        assert_eq!(engine.lock().await.tick(), 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_stop_before_first_cycle() {
        let engine = shared_default();
        let operator = Arc::new(OperatorState::with_bounds(0, 0, 0));
        operator.request_stop();
        let mut source = RngSource::seeded(1);

        let result = run_simulation(&engine, &mut source, &operator, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_cycles, 0);
        assert_eq!(engine.lock().await.tick(), 0);
    }

    #[tokio::test]
    async fn callback_sees_every_cycle_in_order() {
        struct Recorder {
            ticks: Vec<u64>,
        }
        impl TickCallback for Recorder {
            fn on_cycle(&mut self, report: &CycleReport) {
                self.ticks.push(report.snapshot.tick);
            }
        }

        let engine = shared_default();
        let operator = Arc::new(OperatorState::with_bounds(0, 3, 0));
        let mut source = RngSource::seeded(9);
        let mut recorder = Recorder { ticks: Vec::new() };

        let _ = run_simulation(&engine, &mut source, &operator, &mut recorder).await;

        assert_eq!(recorder.ticks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn scripted_run_reaches_waitlist() {
        let engine = SimulationEngine::from_regions(vec![RegionState::new("North", 1)])
            .unwrap()
            .into_shared();
        let operator = Arc::new(OperatorState::with_bounds(0, 2, 0));
        let mut source = ScriptedSource::new()
            .then(0, ActionKind::Purchase, 100)
            .then(0, ActionKind::Purchase, 101);

        let _ = run_simulation(&engine, &mut source, &operator, &mut NoOpCallback).await;

        let snap = engine.lock().await.snapshot();
        let north = snap.region("North").unwrap();
        assert_eq!(north.inventory_units, 0);
        assert_eq!(north.waitlist_count, 1);
    }

    #[tokio::test]
    async fn callback_runs_under_engine_lock() {
        struct LockCheck {
            engine: SharedEngine,
            locked: Vec<bool>,
        }
        impl TickCallback for LockCheck {
            fn on_cycle(&mut self, _report: &CycleReport) {
                self.locked.push(self.engine.try_lock().is_err());
            }
        }

        let engine = shared_default();
        let operator = Arc::new(OperatorState::with_bounds(0, 3, 0));
        let mut source = RngSource::seeded(11);
        let mut check = LockCheck {
            engine: Arc::clone(&engine),
            locked: Vec::new(),
        };

        let _ = run_simulation(&engine, &mut source, &operator, &mut check).await;

        assert_eq!(check.locked, vec![true, true, true]);
        assert!(engine.try_lock().is_ok());
    }

    #[tokio::test]
    async fn paused_cycles_publish_without_advancing() {
        struct Counter {
            cycles: u64,
            events: u64,
        }
        impl TickCallback for Counter {
            fn on_cycle(&mut self, report: &CycleReport) {
                self.cycles = self.cycles.saturating_add(1);
                if report.event.is_some() {
                    self.events = self.events.saturating_add(1);
                }
            }
        }

        let engine = shared_default();
        engine.lock().await.toggle_pause();
        let before = engine.lock().await.snapshot();

        let operator = Arc::new(OperatorState::with_bounds(0, 1, 0));
        let loop_engine = Arc::clone(&engine);
        let loop_operator = Arc::clone(&operator);
        let handle = tokio::spawn(async move {
            let mut source = RngSource::seeded(4);
            let mut counter = Counter { cycles: 0, events: 0 };
            let result =
                run_simulation(&loop_engine, &mut source, &loop_operator, &mut counter).await;
            (result, counter.cycles, counter.events)
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        operator.request_stop();
        let (result, cycles, events) = handle.await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.ticks_advanced, 0);
        assert_eq!(events, 0);
        assert_eq!(cycles, result.total_cycles);
        assert_eq!(engine.lock().await.snapshot(), before);
    }
}
