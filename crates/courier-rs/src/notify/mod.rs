//! Push-driven notification dispatch.
//!
//! One inbound push event becomes a sequence of N tickets, each tagged
//! distinctly, separated by a fixed delay. The payload can shape the
//! text; it can never shape N or the pacing. See
//! [`NotificationDispatcher`] for the state machine, [`PushPayload`] for
//! the tolerant decoder, and [`ScheduledAlerts`] for the time-of-day
//! reminders driven by periodic sync.

mod dispatcher;
mod payload;
mod schedule;

pub use dispatcher::{
    CancelHandle, CancelToken, ClickOutcome, DispatchReport, DispatchState,
    NotificationDispatcher, cancel_pair,
};
pub use payload::{PushPayload, TicketAction};
pub use schedule::ScheduledAlerts;

use serde::{Deserialize, Serialize};

/// Click action identifier the dispatcher treats as "just dismiss".
pub const ACTION_CLOSE: &str = "close";
/// The default click action: focus or open a window.
pub const ACTION_OPEN: &str = "open";

/// One alert handed to the platform tray.
///
/// Identity is the `tag`: the tray replaces an existing alert with the same
/// tag instead of stacking a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub icon: String,
    /// Opaque payload data echoed back on click.
    pub data: serde_json::Value,
    pub actions: Vec<TicketAction>,
}
