//! Convenience re-exports for common `courier-rs` types.
//!
//! Meant to be glob-imported when embedding the agent:
//!
//! ```ignore
//! use courier_rs::prelude::*;
//! ```
//!
//! This pulls in the types needed for the vast majority of host programs:
//! the [`ServiceAgent`] and its config, the cache store, the platform
//! seams, and the control channel. Specialized types (dispatch internals,
//! lifecycle reports) are intentionally excluded — import those from their
//! modules directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{CacheMode, CachedResponse, FetchRequest};

// ── Agent runtime ───────────────────────────────────────────────────
pub use crate::agent::{AgentConfig, AgentPhase, NotifyConfig, ScheduleConfig, ServiceAgent};

// ── Cache ───────────────────────────────────────────────────────────
pub use crate::cache::{CacheStore, MemoryCacheStore};

// ── Routing ─────────────────────────────────────────────────────────
pub use crate::routing::{RoutePolicy, classify};

// ── Notifications ───────────────────────────────────────────────────
pub use crate::notify::{CancelToken, ClickOutcome, PushPayload, Ticket, cancel_pair};

// ── Control channel ─────────────────────────────────────────────────
pub use crate::control::{ClearCacheAck, ControlChannel, HostMessage, control_channel};

// ── Platform seams ──────────────────────────────────────────────────
pub use crate::platform::{
    ClientWindows, DetachedWindows, HttpNetwork, LogNotifier, Network, Notifier, PageClient,
};
