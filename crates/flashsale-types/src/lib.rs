//! Shared type definitions for the flash sale telemetry simulator.
//!
//! This crate is the single source of truth for the values that cross the
//! boundary between the simulation engine and the dashboard. Types defined
//! here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier wrappers for events and synthetic shoppers
//! - [`enums`] -- Shopper actions and event severity tiers
//! - [`structs`] -- Region state, events, and the engine snapshot

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionKind, Severity};
pub use ids::{EventId, UserId};
pub use structs::{EngineSnapshot, Event, RegionState};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings for every #[ts(export)] type into
        // `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::EventId::export_all();
        let _ = crate::ids::UserId::export_all();

        let _ = crate::enums::ActionKind::export_all();
        let _ = crate::enums::Severity::export_all();

        let _ = crate::structs::RegionState::export_all();
        let _ = crate::structs::Event::export_all();
        let _ = crate::structs::EngineSnapshot::export_all();
    }
}
