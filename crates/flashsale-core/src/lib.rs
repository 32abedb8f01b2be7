//! Simulation engine, refresh loop, and operator controls for the flash
//! sale telemetry simulator.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `flashsale-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`SimulationEngine`]: inventory, waitlists, the capped
//!   event log, and the per-tick transition rules.
//! - [`random`] -- [`RandomSource`] trait with seeded and scripted sources.
//! - [`operator`] -- Runtime knobs shared with the HTTP layer.
//! - [`runner`] -- The fixed-cadence refresh loop.
//!
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`RandomSource`]: random::RandomSource

pub mod config;
pub mod engine;
pub mod operator;
pub mod random;
pub mod runner;
