//! Identifier wrappers.
//!
//! Events carry a time-ordered UUID v7 so feed entries sort and key
//! naturally. Shoppers are synthetic and only ever identified by a small
//! integer drawn each tick.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a generated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Synthetic shopper identifier.
///
/// Drawn uniformly from [`UserId::MIN`]..=[`UserId::MAX`] each tick; the
/// same value may recur across ticks and carries no identity beyond display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserId(pub u32);

impl UserId {
    /// Lowest synthetic shopper id.
    pub const MIN: u32 = 100;
    /// Highest synthetic shopper id.
    pub const MAX: u32 = 999;

    /// Return the raw integer value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_distinct() {
        let first = EventId::new();
        let second = EventId::new();
        assert_ne!(first, second);
        assert_eq!(first.into_inner().get_version_num(), 7);
    }

    #[test]
    fn event_id_display_matches_uuid() {
        let id = EventId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn user_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&UserId(512)).ok();
        assert_eq!(json.as_deref(), Some("512"));
    }
}
