//! Shared application state for the observer server.
//!
//! [`AppState`] holds the broadcast channel for cycle summaries, the last
//! published [`EngineSnapshot`], and handles to the engine and operator
//! controls. Every read endpoint is served from the cached snapshot so a
//! slow client never holds the engine lock.

use std::sync::Arc;

use flashsale_core::engine::SharedEngine;
use flashsale_core::operator::OperatorState;
use flashsale_core::runner::CycleReport;
use flashsale_types::{EngineSnapshot, Event};
use tokio::sync::{RwLock, broadcast};

use crate::dashboard::Dashboard;
use crate::error::ObserverError;

/// Capacity of the broadcast channel for cycle summaries.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON-serializable cycle summary pushed over the `WebSocket`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TickBroadcast {
    /// Refresh cycle counter.
    pub cycle: u64,
    /// Ticks advanced so far.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// The event produced this cycle, if the engine advanced.
    pub event: Option<Event>,
    /// Units left across all regions.
    pub total_inventory: u64,
    /// Waitlisted shoppers across all regions.
    pub total_waitlist: u64,
}

impl TickBroadcast {
    /// Project a cycle report into a broadcast message.
    pub fn from_report(report: &CycleReport) -> Self {
        Self {
            cycle: report.cycle,
            tick: report.snapshot.tick,
            paused: report.snapshot.paused,
            event: report.event.clone(),
            total_inventory: report.snapshot.total_inventory(),
            total_waitlist: report.snapshot.total_waitlist(),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for cycle summary messages.
    pub tx: broadcast::Sender<TickBroadcast>,
    /// The most recently published engine snapshot.
    pub snapshot: Arc<RwLock<EngineSnapshot>>,
    /// The engine itself, needed only to forward the pause toggle.
    pub engine: Option<SharedEngine>,
    /// Shared operator control state.
    pub operator_state: Option<Arc<OperatorState>>,
    /// Compiled dashboard template.
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    /// Create a read-only application state with an empty snapshot.
    pub fn new() -> Result<Self, ObserverError> {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self {
            tx,
            snapshot: Arc::new(RwLock::new(EngineSnapshot::default())),
            engine: None,
            operator_state: None,
            dashboard: Arc::new(Dashboard::new()?),
        })
    }

    /// Create an application state wired to a running engine.
    ///
    /// The cached snapshot is seeded from the engine so the dashboard has
    /// regions to show before the first cycle completes.
    pub async fn with_controls(
        engine: SharedEngine,
        operator: Arc<OperatorState>,
    ) -> Result<Self, ObserverError> {
        let initial = engine.lock().await.snapshot();
        let mut state = Self::new()?;
        state.snapshot = Arc::new(RwLock::new(initial));
        state.engine = Some(engine);
        state.operator_state = Some(operator);
        Ok(state)
    }

    /// Subscribe to the cycle broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TickBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a cycle summary to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, summary: &TickBroadcast) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(summary.clone()).unwrap_or(0)
    }

    /// Replace the cached snapshot.
    pub async fn publish_snapshot(&self, snapshot: EngineSnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Current refresh cadence for the dashboard, in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.operator_state
            .as_ref()
            .map_or(DEFAULT_REFRESH_MS, |op| op.tick_interval_ms())
    }
}

/// Dashboard refresh cadence when no operator state is attached.
const DEFAULT_REFRESH_MS: u64 = 1000;
