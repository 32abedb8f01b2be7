//! Server-rendered dashboard page.
//!
//! Renders an [`EngineSnapshot`] into three panels: inventory by region,
//! the live event feed, and waitlist pressure. Bars are plain CSS widths
//! computed here so the page works without client-side scripting; a meta
//! refresh reloads it at the simulation cadence.
//!
//! The inventory axis is pinned to [`INVENTORY_AXIS_MAX`] units regardless of
//! actual stock. The waitlist axis scales to the largest waitlist.

use flashsale_types::{EngineSnapshot, Event};
use minijinja::Environment;
use serde::Serialize;

/// Page title.
pub const TITLE: &str = "Peak Commerce Intelligence Platform";

/// Subtitle under the page title.
pub const CAPTION: &str = "Real-Time Operations Dashboard — Flash Sale Simulation";

/// Fixed upper bound of the inventory chart.
pub const INVENTORY_AXIS_MAX: u64 = 6;

const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE_SOURCE: &str = include_str!("../templates/dashboard.html");

/// The compiled dashboard template.
///
/// The `.html` template name turns on minijinja's HTML auto-escaping, so
/// region names and status messages are escaped on output.
#[derive(Debug)]
pub struct Dashboard {
    env: Environment<'static>,
}

impl Dashboard {
    /// Compile the embedded template.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
        Ok(Self { env })
    }

    /// Render the full page for a snapshot.
    pub fn render(&self, snapshot: &EngineSnapshot, tick_interval_ms: u64) -> Result<String, minijinja::Error> {
        let view = DashboardView::build(snapshot, tick_interval_ms);
        self.env.get_template(TEMPLATE_NAME)?.render(&view)
    }
}

/// One bar in a region chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionBar {
    /// Region name.
    pub name: String,
    /// Raw value shown on the label.
    pub value: u64,
    /// Bar height as a percentage of the axis, 0 to 100.
    pub percent: u64,
}

/// One card in the event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCard {
    /// Severity badge text (`INFO`, `ALERT`, `CRITICAL`).
    pub severity: &'static str,
    /// CSS class selecting the card background.
    pub css_class: &'static str,
    /// `HH:MM:SS`.
    pub time: String,
    /// Region name.
    pub region: String,
    /// Synthetic shopper id.
    pub user_id: u32,
    /// Action label.
    pub action: &'static str,
    /// Outcome text.
    pub status: String,
}

impl From<&Event> for EventCard {
    fn from(event: &Event) -> Self {
        Self {
            severity: event.severity.label(),
            css_class: event.severity.css_class(),
            time: event.clock_time(),
            region: event.region.clone(),
            user_id: event.user_id.get(),
            action: event.action.label(),
            status: event.status_message.clone(),
        }
    }
}

/// Everything the template needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    /// Page title.
    pub title: &'static str,
    /// Page subtitle.
    pub caption: &'static str,
    /// Ticks advanced so far.
    pub tick: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Meta refresh period in whole seconds (at least 1).
    pub refresh_seconds: u64,
    /// Inventory axis maximum.
    pub inventory_axis_max: u64,
    /// Waitlist axis maximum (largest waitlist, at least 1).
    pub waitlist_axis_max: u64,
    /// Inventory bars in region order.
    pub inventory: Vec<RegionBar>,
    /// Waitlist bars in region order.
    pub waitlist: Vec<RegionBar>,
    /// Event cards, most recent first.
    pub events: Vec<EventCard>,
}

impl DashboardView {
    /// Project a snapshot into template data.
    pub fn build(snapshot: &EngineSnapshot, tick_interval_ms: u64) -> Self {
        let waitlist_axis_max = snapshot
            .regions
            .iter()
            .map(|r| r.waitlist_count)
            .max()
            .unwrap_or(0)
            .max(1);

        let inventory = snapshot
            .regions
            .iter()
            .map(|r| {
                let value = u64::from(r.inventory_units);
                RegionBar {
                    name: r.name.clone(),
                    value,
                    percent: percent_of(value, INVENTORY_AXIS_MAX),
                }
            })
            .collect();

        let waitlist = snapshot
            .regions
            .iter()
            .map(|r| RegionBar {
                name: r.name.clone(),
                value: r.waitlist_count,
                percent: percent_of(r.waitlist_count, waitlist_axis_max),
            })
            .collect();

        Self {
            title: TITLE,
            caption: CAPTION,
            tick: snapshot.tick,
            paused: snapshot.paused,
            refresh_seconds: tick_interval_ms.div_ceil(1000).max(1),
            inventory_axis_max: INVENTORY_AXIS_MAX,
            waitlist_axis_max,
            inventory,
            waitlist,
            events: snapshot.events.iter().map(EventCard::from).collect(),
        }
    }
}

/// `value / axis` as a whole percentage, capped at 100.
fn percent_of(value: u64, axis: u64) -> u64 {
    value
        .min(axis)
        .saturating_mul(100)
        .checked_div(axis)
        .unwrap_or(0)
}
