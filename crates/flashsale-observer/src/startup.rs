//! Launches the dashboard server on a background task.
//!
//! The listener is bound before the task is spawned, so a port clash is
//! reported to the caller at startup instead of being logged from inside
//! the task.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind `config` and serve on a background task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or already
/// in use.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = crate::server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state).await {
            tracing::error!(error = %e, "Dashboard server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Dashboard server spawned");
    Ok(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawns_on_ephemeral_port() {
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        };
        let state = Arc::new(AppState::new().unwrap());
        let handle = spawn_observer(&config, state).await.unwrap();
        assert!(!handle.is_finished());
        handle.abort();
    }
}
