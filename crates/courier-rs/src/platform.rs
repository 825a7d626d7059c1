//! Seams the host runtime supplies.
//!
//! The agent core never talks to the network, the notification tray, or the
//! open pages directly — it goes through these traits so that every handler
//! body is testable without a browser runtime. All traits use boxed futures
//! so they stay dyn-compatible (object-safe) and can be held as
//! `Arc<dyn Trait>` inside the agent.
//!
//! | Trait | Real implementation | Concern |
//! |-------|---------------------|---------|
//! | [`Network`] | [`HttpNetwork`] (reqwest) | Same-origin fetches |
//! | [`Notifier`] | host-owned; [`LogNotifier`] for CLIs | Presenting alerts |
//! | [`ClientWindows`] | host-owned; [`DetachedWindows`] for CLIs | Page clients, focus, messaging |

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::info;

use crate::control::HostMessage;
use crate::notify::Ticket;
use crate::{CacheMode, CachedResponse, FetchRequest};

/// Boxed future returned by platform seam methods.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ── Network ────────────────────────────────────────────────────────

/// Outbound fetch capability.
pub trait Network: Send + Sync {
    /// Fetch a same-origin resource.
    ///
    /// `mode` controls transport-level caching only; the agent's own cache
    /// is layered on top by the routing engine.
    fn fetch(
        &self,
        request: FetchRequest,
        mode: CacheMode,
    ) -> PlatformFuture<'_, Result<CachedResponse, String>>;
}

/// [`Network`] implementation over a reqwest client, rooted at one origin.
pub struct HttpNetwork {
    client: reqwest::Client,
    origin: String,
}

impl HttpNetwork {
    /// Create a network rooted at `origin` (e.g. `https://chat.example.com`).
    ///
    /// The client carries a 30-second transport timeout; a fetch that never
    /// resolves is otherwise the platform's problem, not the agent's.
    pub fn new(origin: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("courier-agent/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Ok(Self { client, origin })
    }
}

impl Network for HttpNetwork {
    fn fetch(
        &self,
        request: FetchRequest,
        mode: CacheMode,
    ) -> PlatformFuture<'_, Result<CachedResponse, String>> {
        Box::pin(async move {
            let url = format!("{}{}", self.origin, request.path);
            let method: reqwest::Method = request
                .method
                .parse()
                .map_err(|_| format!("invalid HTTP method {}", request.method))?;
            let mut builder = self.client.request(method, &url);
            if mode == CacheMode::NoStore {
                builder = builder.header("Cache-Control", "no-store");
            }
            let resp = builder
                .send()
                .await
                .map_err(|e| format!("fetch {url} failed: {e}"))?;
            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string();
            let body = resp
                .bytes()
                .await
                .map_err(|e| format!("failed to read body of {url}: {e}"))?
                .to_vec();
            Ok(CachedResponse {
                status,
                content_type,
                body,
            })
        })
    }
}

// ── Notifier ───────────────────────────────────────────────────────

/// Presents one alert via the platform's notification tray.
///
/// The tray deduplicates by [`Ticket::tag`]: showing a ticket with an
/// existing tag replaces the previous alert rather than stacking.
pub trait Notifier: Send + Sync {
    fn show(&self, ticket: Ticket) -> PlatformFuture<'_, Result<(), String>>;
}

/// A notifier that logs tickets instead of presenting them.
///
/// Useful for CLIs and headless smoke tests.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, ticket: Ticket) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move {
            info!("notification [{}] {}: {}", ticket.tag, ticket.title, ticket.body);
            Ok(())
        })
    }
}

// ── Client windows ─────────────────────────────────────────────────

/// One open page under the agent's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageClient {
    pub id: String,
    pub url: String,
}

/// Access to the pages the agent serves: enumeration, focus, window
/// creation, claiming, and message delivery.
pub trait ClientWindows: Send + Sync {
    /// All currently open page clients, controlled or not.
    fn clients(&self) -> PlatformFuture<'_, Vec<PageClient>>;

    /// Bring an open page to the foreground.
    fn focus(&self, id: String) -> PlatformFuture<'_, Result<(), String>>;

    /// Open a new window at the given path.
    fn open_window(&self, path: String) -> PlatformFuture<'_, Result<(), String>>;

    /// Take control of an already-open page without a reload.
    fn claim(&self, id: String) -> PlatformFuture<'_, Result<(), String>>;

    /// Deliver a message to one page.
    fn post_message(&self, id: String, message: HostMessage)
    -> PlatformFuture<'_, Result<(), String>>;
}

/// A [`ClientWindows`] with no pages attached.
///
/// Focus and claim always fail (there is nothing to focus); opening a window
/// and posting messages are logged no-ops. Used by the `courier` CLI.
pub struct DetachedWindows;

impl ClientWindows for DetachedWindows {
    fn clients(&self) -> PlatformFuture<'_, Vec<PageClient>> {
        Box::pin(async { Vec::new() })
    }

    fn focus(&self, id: String) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move { Err(format!("no open page client {id}")) })
    }

    fn open_window(&self, path: String) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move {
            info!("would open window at {path}");
            Ok(())
        })
    }

    fn claim(&self, id: String) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move { Err(format!("no open page client {id}")) })
    }

    fn post_message(
        &self,
        id: String,
        message: HostMessage,
    ) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move {
            info!("would post {message:?} to client {id}");
            Ok(())
        })
    }
}


// ── Test fakes ─────────────────────────────────────────────────────
