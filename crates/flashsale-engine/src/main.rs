//! Flash sale simulator binary.
//!
//! Wires the engine, the refresh loop, and the dashboard server together.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `flashsale-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the engine from the store config
//! 4. Create operator state from the simulation bounds
//! 5. Start the dashboard server
//! 6. Run the refresh loop until stopped (`Ctrl-C` or the stop endpoint)
//! 7. Log the result

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use flashsale_core::config::{FlashSaleConfig, LoggingConfig};
use flashsale_core::engine::SimulationEngine;
use flashsale_core::operator::OperatorState;
use flashsale_core::random::RngSource;
use flashsale_core::runner;
use flashsale_observer::server::ServerConfig;
use flashsale_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::observer_callback::ObserverCallback;

const CONFIG_PATH: &str = "flashsale-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(from_file, "flashsale-engine starting");
    info!(
        regions = ?config.store.regions,
        initial_inventory = config.store.initial_inventory,
        tick_interval_ms = config.simulation.tick_interval_ms,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    // 3. Build the engine.
    let engine = SimulationEngine::new(&config.store)?.into_shared();

    // 4. Operator state.
    let operator = Arc::new(OperatorState::new(&config.simulation));

    // 5. Dashboard server.
    let app_state = Arc::new(AppState::with_controls(Arc::clone(&engine), Arc::clone(&operator)).await?);
    let server_config = ServerConfig::from(&config.observer);
    let observer_handle =
        flashsale_observer::startup::spawn_observer(&server_config, Arc::clone(&app_state)).await?;

    // Ctrl-C ends the loop the same way the stop endpoint does.
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the refresh loop.
    let mut source = RngSource::from_seed_option(config.simulation.seed);
    let mut callback = ObserverCallback::new(app_state);
    let result = runner::run_simulation(&engine, &mut source, &operator, &mut callback).await;

    // 7. Log results.
    let final_snapshot = engine.lock().await.snapshot();
    runner::log_simulation_end(&result, &final_snapshot);

    observer_handle.abort();
    info!(end_reason = ?result.end_reason, "flashsale-engine shutdown complete");
    Ok(())
}

/// Load `flashsale-config.yaml` from the working directory.
///
/// A missing file yields the defaults with environment overrides applied.
fn load_config() -> Result<(FlashSaleConfig, bool), AppError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        return Ok((FlashSaleConfig::from_file(path)?, true));
    }
    let mut config = FlashSaleConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok((config, false))
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
