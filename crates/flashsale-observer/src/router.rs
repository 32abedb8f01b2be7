//! Axum router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete router: dashboard, read API, operator API, and the
/// `WebSocket` stream.
///
/// CORS allows any origin so a separately hosted dashboard can poll the
/// JSON API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::index))
        .route("/toggle-pause", post(operator::toggle_pause_form))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // Read API
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/regions", get(handlers::list_regions))
        .route("/api/regions/{name}", get(handlers::get_region))
        .route("/api/events", get(handlers::list_events))
        // Operator API
        .route("/api/operator/toggle-pause", post(operator::toggle_pause))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
