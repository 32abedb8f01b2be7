//! Core records: per-region counters, generated events, and the read-only
//! engine snapshot handed to the dashboard.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, Severity};
use crate::ids::{EventId, UserId};

// ---------------------------------------------------------------------------
// RegionState
// ---------------------------------------------------------------------------

/// Inventory and waitlist counters for a single sales region.
///
/// `inventory_units` only ever decreases, one unit at a time, and never
/// below zero. `waitlist_count` only ever increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegionState {
    /// Region name, e.g. `North`.
    pub name: String,
    /// Units still available for purchase.
    pub inventory_units: u32,
    /// Shoppers who tried to buy after the region sold out.
    pub waitlist_count: u64,
}

impl RegionState {
    /// Create a region with the given starting stock and an empty waitlist.
    pub fn new(name: impl Into<String>, inventory_units: u32) -> Self {
        Self {
            name: name.into(),
            inventory_units,
            waitlist_count: 0,
        }
    }

    /// Whether the region has no units left.
    pub const fn is_sold_out(&self) -> bool {
        self.inventory_units == 0
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One simulated shopper interaction and its outcome.
///
/// Events are immutable once created. The engine keeps only the most
/// recent handful for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// The tick that produced this event (1-based).
    pub tick: u64,
    /// Wall-clock time the event was generated.
    pub timestamp: DateTime<Utc>,
    /// Region the shopper was routed to.
    pub region: String,
    /// Synthetic shopper id.
    pub user_id: UserId,
    /// What the shopper did.
    pub action: ActionKind,
    /// Human-readable outcome.
    pub status_message: String,
    /// Severity tier of the outcome.
    pub severity: Severity,
}

impl Event {
    /// Timestamp in the host's local time, formatted as `HH:MM:SS` for
    /// event cards.
    pub fn clock_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// Read-only copy of the engine state at the end of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EngineSnapshot {
    /// Number of ticks advanced so far.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Region counters in display order.
    pub regions: Vec<RegionState>,
    /// Recent events, most recent first.
    pub events: Vec<Event>,
}

impl EngineSnapshot {
    /// Look up a region by name.
    pub fn region(&self, name: &str) -> Option<&RegionState> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// The most recent event, if any tick has run.
    pub fn latest_event(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Total units left across all regions.
    pub fn total_inventory(&self) -> u64 {
        self.regions
            .iter()
            .map(|r| u64::from(r.inventory_units))
            .fold(0_u64, u64::saturating_add)
    }

    /// Total waitlisted shoppers across all regions.
    pub fn total_waitlist(&self) -> u64 {
        self.regions
            .iter()
            .map(|r| r.waitlist_count)
            .fold(0_u64, u64::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_event() -> Event {
        Event {
            id: EventId::new(),
            tick: 3,
            timestamp: Utc.with_ymd_and_hms(2024, 11, 29, 9, 5, 7).single().unwrap_or_default(),
            region: String::from("North"),
            user_id: UserId(431),
            action: ActionKind::Purchase,
            status_message: String::from("Order Confirmed"),
            severity: Severity::Info,
        }
    }

    #[test]
    fn clock_time_is_local_and_zero_padded() {
        let event = sample_event();
        let local = Local.from_utc_datetime(&event.timestamp.naive_utc());
        let shown = event.clock_time();

        assert_eq!(shown, local.format("%H:%M:%S").to_string());
        assert_eq!(shown.len(), 8);
        // Zone offsets shift hours and minutes, never seconds.
        assert!(shown.ends_with(":07"));
    }

    #[test]
    fn snapshot_totals_and_lookup() {
        let mut south = RegionState::new("South", 0);
        south.waitlist_count = 4;
        let snapshot = EngineSnapshot {
            tick: 9,
            paused: false,
            regions: vec![RegionState::new("North", 3), south],
            events: vec![sample_event()],
        };

        assert_eq!(snapshot.total_inventory(), 3);
        assert_eq!(snapshot.total_waitlist(), 4);
        assert!(snapshot.region("South").is_some_and(RegionState::is_sold_out));
        assert!(snapshot.region("Central").is_none());
        assert_eq!(snapshot.latest_event().map(|e| e.tick), Some(3));
    }

    #[test]
    fn event_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(sample_event()).ok();
        let json = json.unwrap_or_default();
        assert_eq!(json.get("status_message").and_then(|v| v.as_str()), Some("Order Confirmed"));
        assert_eq!(json.get("action").and_then(|v| v.as_str()), Some("Purchase"));
        assert_eq!(json.get("user_id").and_then(serde_json::Value::as_u64), Some(431));
    }
}
