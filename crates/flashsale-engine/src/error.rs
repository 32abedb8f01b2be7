//! Top-level error for the simulator binary.

use flashsale_core::config::ConfigError;
use flashsale_core::engine::EngineError;
use flashsale_observer::ObserverError;
use flashsale_observer::startup::StartupError;

/// Every failure `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The engine rejected its initial state.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// The dashboard state could not be built.
    #[error("dashboard error: {source}")]
    Dashboard {
        /// The underlying observer error.
        #[from]
        source: ObserverError,
    },

    /// The dashboard server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: StartupError,
    },
}
