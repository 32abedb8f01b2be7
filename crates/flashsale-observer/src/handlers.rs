//! Read-only endpoint handlers.
//!
//! All handlers read from the cached [`EngineSnapshot`] in [`AppState`];
//! none of them touch the engine lock.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Operations dashboard (HTML) |
//! | `GET` | `/api/snapshot` | Full engine snapshot |
//! | `GET` | `/api/regions` | Region stock and waitlists |
//! | `GET` | `/api/regions/{name}` | Single region |
//! | `GET` | `/api/events` | Recent events, newest first |
//!
//! [`EngineSnapshot`]: flashsale_types::EngineSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use flashsale_types::{Event, Severity};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Only return events of this severity (`info`, `alert`, `critical`).
    pub severity: Option<String>,
    /// Filter events by region name.
    pub region: Option<String>,
    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Render the operations dashboard.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let html = state.dashboard.render(&snapshot, state.tick_interval_ms())?;
    Ok(Html(html))
}

// ---------------------------------------------------------------------------
// GET /api/snapshot
// ---------------------------------------------------------------------------

/// Return the full cached snapshot.
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(snapshot.clone())
}

// ---------------------------------------------------------------------------
// GET /api/regions
// ---------------------------------------------------------------------------

/// List every region in display order.
pub async fn list_regions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(serde_json::json!({
        "count": snapshot.regions.len(),
        "total_inventory": snapshot.total_inventory(),
        "total_waitlist": snapshot.total_waitlist(),
        "regions": snapshot.regions,
    }))
}

/// Return a single region by name.
pub async fn get_region(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let region = snapshot
        .region(&name)
        .cloned()
        .ok_or_else(|| ObserverError::NotFound(format!("region {name}")))?;
    Ok(Json(region))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Return recent events, newest first.
///
/// The log holds at most a handful of entries, so `limit` only trims.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let severity = params.severity.as_deref().map(parse_severity).transpose()?;

    let snapshot = state.snapshot.read().await;
    let limit = params.limit.unwrap_or(snapshot.events.len());

    let events: Vec<&Event> = snapshot
        .events
        .iter()
        .filter(|e| severity.is_none_or(|s| e.severity == s))
        .filter(|e| params.region.as_deref().is_none_or(|r| e.region == r))
        .take(limit)
        .collect();

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_severity(s: &str) -> Result<Severity, ObserverError> {
    match s.to_ascii_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "alert" => Ok(Severity::Alert),
        "critical" => Ok(Severity::Critical),
        _ => Err(ObserverError::InvalidQuery(format!(
            "unknown severity {s:?} (expected info, alert, or critical)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_case_insensitive() {
        assert!(matches!(parse_severity("CRITICAL"), Ok(Severity::Critical)));
        assert!(matches!(parse_severity("alert"), Ok(Severity::Alert)));
        assert!(parse_severity("warning").is_err());
    }
}
