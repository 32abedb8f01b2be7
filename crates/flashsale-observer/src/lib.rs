//! Dashboard and operator API for the flash sale simulator.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Operations dashboard** (`GET /`): server-rendered inventory,
//!   event feed, and waitlist panels with a pause/resume button
//! - **REST endpoints** for the current snapshot, regions, and events
//! - **Operator endpoints** for pause, speed, status, and stop
//! - **`WebSocket` endpoint** (`/ws/ticks`) streaming one summary per
//!   refresh cycle via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! The refresh loop publishes an [`EngineSnapshot`] into [`AppState`]
//! after every cycle. Read endpoints serve that cached copy, so only the
//! pause toggle ever takes the engine lock from the HTTP side.
//!
//! [`EngineSnapshot`]: flashsale_types::EngineSnapshot

pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, TickBroadcast};
