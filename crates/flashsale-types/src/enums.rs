//! Enumeration types for the flash sale simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Shopper actions
// ---------------------------------------------------------------------------

/// What a simulated shopper did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Looked at the product page.
    View,
    /// Put the product in the cart.
    AddToCart,
    /// Attempted to buy one unit.
    Purchase,
}

impl ActionKind {
    /// Every action kind, in draw order. Ticks pick uniformly from this list.
    pub const ALL: [Self; 3] = [Self::View, Self::AddToCart, Self::Purchase];

    /// Human-readable label shown on event cards.
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::AddToCart => "Add To Cart",
            Self::Purchase => "Purchase",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity tier attached to every event.
///
/// Ordered so that `Info < Alert < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Routine activity.
    Info,
    /// Stock in the region is running low.
    Alert,
    /// The region is sold out and shoppers are being waitlisted.
    Critical,
}

impl Severity {
    /// Upper-case badge text shown on event cards.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
        }
    }

    /// CSS class selecting the card background for this tier.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Critical => "critical",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
