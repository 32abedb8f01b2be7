//! `WebSocket` stream of cycle summaries.
//!
//! Clients connect to `GET /ws/ticks` and receive one JSON-encoded
//! [`TickBroadcast`](crate::state::TickBroadcast) per refresh cycle,
//! paused cycles included. A client that falls behind skips to the newest
//! message.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade to a `WebSocket` and start streaming.
pub async fn ws_ticks(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_cycles(socket, state))
}

async fn stream_cycles(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Ok(summary) => {
                    let json = match serde_json::to_string(&summary) {
                        Ok(j) => j,
                        Err(e) => {
                            warn!("Failed to serialize cycle summary: {e}");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket client disconnected (send failed)");
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "WebSocket client lagged, skipping ahead");
                }
                Err(RecvError::Closed) => {
                    debug!("Broadcast channel closed, closing WebSocket");
                    return;
                }
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("WebSocket client disconnected");
                    return;
                }
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        return;
                    }
                }
                Some(Err(e)) => {
                    debug!("WebSocket error: {e}");
                    return;
                }
                // Client text and binary frames are ignored.
                Some(Ok(_)) => {}
            },
        }
    }
}
