//! Bridges the refresh loop to the dashboard state.
//!
//! After each cycle this broadcasts a [`TickBroadcast`] to `WebSocket`
//! clients and replaces the cached snapshot the HTTP handlers read from.

use std::sync::Arc;

use flashsale_core::runner::{CycleReport, TickCallback};
use flashsale_observer::state::{AppState, TickBroadcast};
use tracing::debug;

/// Publishes every cycle to the observer.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for ObserverCallback {
    fn on_cycle(&mut self, report: &CycleReport) {
        let receivers = self.state.broadcast(&TickBroadcast::from_report(report));
        debug!(cycle = report.cycle, receivers, "Cycle broadcast sent");

        // try_write keeps the loop from waiting on a slow reader; a
        // skipped update is replaced next cycle.
        match self.state.snapshot.try_write() {
            Ok(mut snap) => *snap = report.snapshot.clone(),
            Err(_) => debug!(cycle = report.cycle, "Snapshot busy, skipping update"),
        }
    }
}
