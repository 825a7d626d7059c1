//! Background agent for a messaging application.
//!
//! `courier-rs` implements the client-resident worker that sits between a
//! messaging app and the network: it intercepts requests to serve static
//! assets from a versioned cache, keeps that cache coherent across
//! deployments, and turns server-pushed events into a paced sequence of
//! user-visible alerts. The central type is
//! [`ServiceAgent`](agent::worker::ServiceAgent) — one method per platform
//! event, with the host runtime doing dispatch.
//!
//! # Getting started
//!
//! ```ignore
//! use courier_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let config = AgentConfig::new("v1.0.0")
//!         .with_static_assets(["/styles.css", "/manifest.json"]);
//!
//!     let agent = ServiceAgent::new(
//!         config,
//!         Arc::new(MemoryCacheStore::new()),
//!         Arc::new(HttpNetwork::new("https://chat.example.com")?),
//!         Arc::new(LogNotifier),
//!         Arc::new(DetachedWindows),
//!     );
//!
//!     agent.handle_install().await?;
//!     agent.handle_activate().await?;
//!
//!     // The host runtime now routes fetch/push/click events to the agent.
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Serve a request through the cache:** see
//!   [`RoutingEngine`](routing::RoutingEngine) and
//!   [`classify`](routing::classify) for the three fetch policies
//!   (network-first document, stale-while-revalidate assets, network with
//!   cache fallback for everything else).
//!
//! - **Manage cache generations:** see
//!   [`LifecycleManager`](agent::lifecycle::LifecycleManager) for install-time
//!   population and activation-time sweep of stale namespaces, and
//!   [`CacheStore`](cache::CacheStore) / [`MemoryCacheStore`](cache::MemoryCacheStore)
//!   for the store itself.
//!
//! - **Present alerts from a push event:** see
//!   [`NotificationDispatcher`](notify::NotificationDispatcher) for the
//!   sequenced dispatch state machine, [`PushPayload`](notify::PushPayload)
//!   for the tolerant wire decoder, and
//!   [`ScheduledAlerts`](notify::ScheduledAlerts) for time-of-day reminders.
//!
//! - **Send commands to a running agent:** see
//!   [`ControlChannel`](control::ControlChannel) for `SKIP_WAITING` /
//!   `CLEAR_CACHE` and [`HostMessage`](control::HostMessage) for the
//!   agent-to-page sync broadcast.
//!
//! - **Plug in the host platform:** implement the seams in [`platform`] —
//!   [`Network`](platform::Network), [`Notifier`](platform::Notifier), and
//!   [`ClientWindows`](platform::ClientWindows).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | [`ServiceAgent`](agent::worker::ServiceAgent) event surface, [`AgentConfig`](agent::config::AgentConfig), lifecycle manager |
//! | [`cache`] | [`CacheStore`](cache::CacheStore) trait and the in-memory namespaced store |
//! | [`routing`] | Request classification and the three fetch policies |
//! | [`notify`] | Push payload decoding, sequenced dispatch, click routing, scheduled alerts |
//! | [`control`] | Host ↔ agent command channel and sync broadcast |
//! | [`platform`] | Traits the host runtime supplies (network, notifications, windows) |
//!
//! # Design principles
//!
//! 1. **Never brick the app.** A missing icon must not abort an install; an
//!    unreachable network must not fail a request that the cache can answer;
//!    an undecodable payload must still surface a generic alert.
//!
//! 2. **Exactly one live cache generation.** Activation is mark-and-sweep
//!    with a single root — the current version tag. Everything else is
//!    garbage, reclaimed in one place.
//!
//! 3. **Untrusted input never controls resource use.** Sequence length and
//!    pacing come from [`NotifyConfig`](agent::config::NotifyConfig), not
//!    from the payload.
//!
//! 4. **The host owns the event loop.** The agent only implements handler
//!    bodies; all ambient platform callbacks become explicit method calls
//!    with injected configuration, so every behavior is testable without a
//!    browser runtime.

pub mod agent;
pub mod cache;
pub mod control;
pub mod notify;
pub mod platform;
pub mod prelude;
pub mod routing;

// ── Request / response types ───────────────────────────────────────

/// How the transport-level cache should treat a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Let the transport use its own caching rules.
    Default,
    /// Bypass the transport cache entirely (`Cache-Control: no-store`).
    NoStore,
}

/// An intercepted request, reduced to what routing needs.
///
/// Strategy selection is a pure function of `path`; the method and any
/// headers pass through to the underlying fetch verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub path: String,
    pub method: String,
}

impl FetchRequest {
    /// A GET request for the given same-origin path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: "GET".to_string(),
        }
    }
}

/// A stored (or freshly fetched) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// A 200 response with the given content type and body.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_request_get_constructor() {
        let req = FetchRequest::get("/styles.css");
        assert_eq!(req.path, "/styles.css");
        assert_eq!(req.method, "GET");
    }

    #[test]
    fn cached_response_text_roundtrip() {
        let resp = CachedResponse::ok("text/html", "<h1>hi</h1>");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.text(), "<h1>hi</h1>");
    }
}
