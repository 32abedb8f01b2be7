//! Operator endpoints for runtime simulation control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/toggle-pause` | Dashboard button; flips pause and redirects to `/` |
//! | `POST` | `/api/operator/toggle-pause` | Flip pause, JSON response |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `GET` | `/api/operator/status` | Current simulation status |
//! | `POST` | `/api/operator/stop` | End the refresh loop and shut down |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Redirect};
use flashsale_core::config::MIN_TICK_INTERVAL_MS;
use flashsale_core::operator::{OperatorState, SimulationStatus};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

// ---------------------------------------------------------------------------
// POST /api/operator/toggle-pause, POST /toggle-pause
// ---------------------------------------------------------------------------

/// Flip the pause flag and return the new state as JSON.
pub async fn toggle_pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let paused = flip_pause(&state).await?;
    let message = if paused {
        "Simulation paused"
    } else {
        "Simulation resumed"
    };
    Ok(Json(serde_json::json!({
        "ok": true,
        "paused": paused,
        "message": message,
    })))
}

/// Form target for the dashboard's pause button.
///
/// Redirects back to the dashboard with `303 See Other` so a browser
/// reload does not resubmit the form.
pub async fn toggle_pause_form(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    flip_pause(&state).await?;
    Ok(Redirect::to("/"))
}

/// Toggle and refresh the cached snapshot, both under the engine lock, so
/// the next page load reflects the new state without waiting a cycle.
///
/// The refresh loop also publishes under the engine lock, so a cycle can
/// never overwrite this snapshot with an older one.
async fn flip_pause(state: &AppState) -> Result<bool, ObserverError> {
    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| ObserverError::Unavailable("engine not attached".to_owned()))?;

    let paused = {
        let mut guard = engine.lock().await;
        let paused = guard.toggle_pause();
        state.publish_snapshot(guard.snapshot()).await;
        paused
    };

    info!(paused, "Pause toggled by operator");
    Ok(paused)
}

// ---------------------------------------------------------------------------
// POST /api/operator/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
///
/// Takes effect at the next sleep of the refresh loop. A malformed body
/// gets the same JSON error envelope as every other rejection.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SetSpeedRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let Json(body) = body?;

    let prev = operator
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidQuery(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            ))
        })?;

    info!(from = prev, to = body.tick_interval_ms, "Tick interval changed");

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {prev}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return tick, pause state, cadence, bounds, and stock totals.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let end_reason = operator.end_reason().await;
    let snapshot = state.snapshot.read().await;

    Ok(Json(SimulationStatus {
        tick: snapshot.tick,
        paused: snapshot.paused,
        stop_requested: operator.is_stop_requested(),
        tick_interval_ms: operator.tick_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        total_inventory: snapshot.total_inventory(),
        total_waitlist: snapshot.total_waitlist(),
        end_reason,
        started_at: operator.started_at().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operator/stop
// ---------------------------------------------------------------------------

/// Ask the refresh loop to finish.
///
/// The loop exits at the start of its next cycle, and the process shuts
/// down with it, dashboard server included.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();
    info!("Stop requested by operator");

    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- simulation and dashboard will shut down before the next tick"
            .to_owned(),
    }))
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or_else(|| ObserverError::Unavailable("operator state not attached".to_owned()))
}
