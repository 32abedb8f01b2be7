//! The flash sale simulation engine.
//!
//! [`SimulationEngine`] owns every piece of mutable simulation state: the
//! per-region inventory and waitlist counters, the capped event log, the
//! pause flag, and the tick counter. It is advanced one tick at a time by
//! [`SimulationEngine::advance`] and read through
//! [`SimulationEngine::snapshot`].
//!
//! # Transition rules
//!
//! | Action | Condition | Mutation | Severity |
//! |--------|-----------|----------|----------|
//! | `Purchase` | stock > 0 | stock -= 1 | `Info`, or `Alert` when stock is now <= 1 |
//! | `Purchase` | stock == 0 | waitlist += 1 | `Critical` |
//! | `AddToCart` | -- | none | `Info` |
//! | `View` | -- | none | `Info` |
//!
//! Stock never goes negative and waitlists never shrink. There is no
//! restocking.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use flashsale_types::{ActionKind, EngineSnapshot, Event, EventId, RegionState, Severity, UserId};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{self, ConfigError, StoreConfig};
use crate::random::RandomSource;

/// Maximum number of events retained in the log.
pub const EVENT_LOG_CAPACITY: usize = 7;

/// A purchase that leaves a region at or below this many units raises an
/// [`Severity::Alert`].
pub const LOW_INVENTORY_THRESHOLD: u32 = 1;

/// Status for a purchase that found stock.
pub const STATUS_ORDER_CONFIRMED: &str = "Order Confirmed";
/// Suffix appended to [`STATUS_ORDER_CONFIRMED`] when stock runs low.
pub const STATUS_LOW_INVENTORY_SUFFIX: &str = " — Low Inventory";
/// Status for a purchase against a sold-out region.
pub const STATUS_WAITLISTED: &str = "Out of Stock → Added to Waitlist";
/// Status for an add-to-cart.
pub const STATUS_OFFER_TRIGGERED: &str = "Personalized Offer Triggered";
/// Status for a product view.
pub const STATUS_PRODUCT_VIEWED: &str = "Product Viewed";

/// Engine handle shared between the refresh loop and the dashboard.
///
/// One lock serializes `advance` + `snapshot` against the pause toggle, so
/// a reader never observes a half-applied tick.
pub type SharedEngine = Arc<Mutex<SimulationEngine>>;

/// Errors that can occur when constructing the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The store configuration is unusable.
    #[error("engine config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

/// Outcome of applying one action to one region.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Outcome {
    status_message: String,
    severity: Severity,
}

/// Owns and advances the simulation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationEngine {
    /// Region counters in display order. Never empty.
    regions: Vec<RegionState>,

    /// Recent events, most recent first, at most [`EVENT_LOG_CAPACITY`].
    events: VecDeque<Event>,

    /// When set, [`advance`](Self::advance) is a no-op.
    paused: bool,

    /// Number of ticks advanced so far.
    tick: u64,
}

impl SimulationEngine {
    /// Create an engine with every configured region at the starting stock,
    /// empty waitlists, an empty log, and `paused = false`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the region list is empty or has
    /// blank or duplicate names.
    pub fn new(config: &StoreConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let regions = config
            .regions
            .iter()
            .map(|name| RegionState::new(name.as_str(), config.initial_inventory))
            .collect();
        Ok(Self::from_validated(regions))
    }

    /// Create an engine from explicit region states (useful for testing and
    /// scripted scenarios).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `regions` is empty or has blank or
    /// duplicate names.
    pub fn from_regions(regions: Vec<RegionState>) -> Result<Self, EngineError> {
        config::validate_region_names(regions.iter().map(|r| r.name.as_str()))?;
        Ok(Self::from_validated(regions))
    }

    const fn from_validated(regions: Vec<RegionState>) -> Self {
        Self {
            regions,
            events: VecDeque::new(),
            paused: false,
            tick: 0,
        }
    }

    /// Wrap the engine for sharing between tasks.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    /// Whether the simulation is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Flip the pause flag and return the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        debug!(paused = self.paused, "Pause toggled");
        self.paused
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one simulated shopper interaction.
    ///
    /// Draws a region, an action, and a user id from `rng` (in that order),
    /// applies the transition rules, and prepends the resulting event to the
    /// log, dropping anything past [`EVENT_LOG_CAPACITY`]. Returns a copy of
    /// the new event.
    ///
    /// Returns `None` without drawing or mutating anything when paused.
    pub fn advance<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<Event> {
        if self.paused {
            return None;
        }

        let region_count = self.regions.len();
        let region_index = rng.index(region_count).min(region_count.saturating_sub(1));
        let action_index = rng
            .index(ActionKind::ALL.len())
            .min(ActionKind::ALL.len().saturating_sub(1));
        let action = ActionKind::ALL
            .get(action_index)
            .copied()
            .unwrap_or(ActionKind::View);
        let user_id = UserId(rng.between(UserId::MIN, UserId::MAX));
        let timestamp = Utc::now();

        // Regions are never empty after construction.
        let region = self.regions.get_mut(region_index)?;
        let outcome = apply_action(region, action);

        self.tick = self.tick.saturating_add(1);
        let event = Event {
            id: EventId::new(),
            tick: self.tick,
            timestamp,
            region: region.name.clone(),
            user_id,
            action,
            status_message: outcome.status_message,
            severity: outcome.severity,
        };

        match event.severity {
            Severity::Critical => warn!(
                tick = event.tick,
                region = %event.region,
                waitlist = region.waitlist_count,
                "Region sold out, shopper waitlisted"
            ),
            Severity::Alert => debug!(
                tick = event.tick,
                region = %event.region,
                inventory = region.inventory_units,
                "Low inventory"
            ),
            Severity::Info => debug!(
                tick = event.tick,
                region = %event.region,
                action = %event.action,
                "Tick advanced"
            ),
        }

        self.events.push_front(event.clone());
        self.events.truncate(EVENT_LOG_CAPACITY);

        Some(event)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Copy the current state for rendering.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.tick,
            paused: self.paused,
            regions: self.regions.clone(),
            events: self.events.iter().cloned().collect(),
        }
    }

    /// Region counters in display order.
    pub fn regions(&self) -> &[RegionState] {
        &self.regions
    }

    /// Look up a region by name.
    pub fn region(&self, name: &str) -> Option<&RegionState> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Recent events, most recent first.
    pub fn events(&self) -> impl ExactSizeIterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of ticks advanced so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}

/// Apply the transition table to a single region.
fn apply_action(region: &mut RegionState, action: ActionKind) -> Outcome {
    match action {
        ActionKind::Purchase => {
            if let Some(remaining) = region.inventory_units.checked_sub(1) {
                region.inventory_units = remaining;
                if remaining <= LOW_INVENTORY_THRESHOLD {
                    Outcome {
                        status_message: format!(
                            "{STATUS_ORDER_CONFIRMED}{STATUS_LOW_INVENTORY_SUFFIX}"
                        ),
                        severity: Severity::Alert,
                    }
                } else {
                    Outcome {
                        status_message: STATUS_ORDER_CONFIRMED.to_owned(),
                        severity: Severity::Info,
                    }
                }
            } else {
                region.waitlist_count = region.waitlist_count.saturating_add(1);
                Outcome {
                    status_message: STATUS_WAITLISTED.to_owned(),
                    severity: Severity::Critical,
                }
            }
        }
        ActionKind::AddToCart => Outcome {
            status_message: STATUS_OFFER_TRIGGERED.to_owned(),
            severity: Severity::Info,
        },
        ActionKind::View => Outcome {
            status_message: STATUS_PRODUCT_VIEWED.to_owned(),
            severity: Severity::Info,
        },
    }
}
