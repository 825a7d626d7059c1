//! Request classification and the three fetch policies.
//!
//! Every intercepted request maps to exactly one [`RoutePolicy`], chosen by
//! [`classify`] — a pure function of the request path, evaluated in order
//! with first match winning:
//!
//! 1. [`Document`](RoutePolicy::Document) — the site root or entry HTML.
//!    Always network, transport cache disabled, cached entry document as
//!    the offline fallback. The entry point must reflect the latest deploy
//!    the instant connectivity exists.
//! 2. [`StaticAsset`](RoutePolicy::StaticAsset) — manifest assets and
//!    anything under the icon directory. Stale-while-revalidate: cached
//!    copy served immediately, refreshed in the background.
//! 3. [`NetworkFirst`](RoutePolicy::NetworkFirst) — everything else.
//!    Network, falling back to any cached match; no match propagates the
//!    network error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::agent::config::AgentConfig;
use crate::cache::CacheStore;
use crate::platform::Network;
use crate::{CacheMode, CachedResponse, FetchRequest};

// ── Classification ─────────────────────────────────────────────────

/// The caching policy applied to one request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Network-first with the cached entry document as offline fallback.
    Document,
    /// Cache-first with background revalidation.
    StaticAsset,
    /// Network-first with the cache as fallback.
    NetworkFirst,
}

impl std::fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutePolicy::Document => write!(f, "document"),
            RoutePolicy::StaticAsset => write!(f, "static-asset"),
            RoutePolicy::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// Classify a request path. Pure — no dependency on method or headers.
pub fn classify(path: &str, config: &AgentConfig) -> RoutePolicy {
    if path == config.root_path || path == config.entry_document {
        return RoutePolicy::Document;
    }
    if config.static_assets.iter().any(|a| a == path) || path.starts_with(&config.icon_prefix) {
        return RoutePolicy::StaticAsset;
    }
    RoutePolicy::NetworkFirst
}

// ── Engine ─────────────────────────────────────────────────────────

/// Applies the policy chosen by [`classify`] to each intercepted request.
pub struct RoutingEngine {
    config: Arc<AgentConfig>,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
}

impl RoutingEngine {
    pub fn new(
        config: Arc<AgentConfig>,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            store,
            network,
        }
    }

    /// Serve one intercepted request.
    ///
    /// Errors surface only when both the network and the cache come up
    /// empty; every recoverable failure degrades silently.
    pub async fn handle(&self, request: FetchRequest) -> Result<CachedResponse, String> {
        let policy = classify(&request.path, &self.config);
        debug!("fetch {} -> {policy}", request.path);
        match policy {
            RoutePolicy::Document => self.handle_document(request).await,
            RoutePolicy::StaticAsset => self.handle_static(request).await,
            RoutePolicy::NetworkFirst => self.handle_network_first(request).await,
        }
    }

    async fn handle_document(&self, request: FetchRequest) -> Result<CachedResponse, String> {
        match self.network.fetch(request, CacheMode::NoStore).await {
            Ok(response) => Ok(response),
            Err(err) => {
                debug!("entry document unreachable, trying cache: {err}");
                self.store
                    .get(self.config.cache_name(), self.config.entry_document.clone())
                    .await
                    .ok_or(err)
            }
        }
    }

    async fn handle_static(&self, request: FetchRequest) -> Result<CachedResponse, String> {
        let namespace = self.config.cache_name();
        if let Some(cached) = self
            .store
            .get(namespace.clone(), request.path.clone())
            .await
        {
            // Serve the cached copy now; refresh it off the request path.
            self.spawn_revalidation(namespace, request);
            return Ok(cached);
        }

        let fresh = self.network.fetch(request.clone(), CacheMode::Default).await?;
        if let Err(err) = self
            .store
            .put(namespace, request.path.clone(), fresh.clone())
            .await
        {
            warn!("failed to cache {}: {err}", request.path);
        }
        Ok(fresh)
    }

    fn spawn_revalidation(&self, namespace: String, request: FetchRequest) {
        let network = self.network.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            match network.fetch(request.clone(), CacheMode::Default).await {
                Ok(fresh) => {
                    if let Err(err) = store.put(namespace, request.path.clone(), fresh).await {
                        warn!("failed to refresh cache entry {}: {err}", request.path);
                    }
                }
                // The previously cached copy remains valid.
                Err(err) => debug!("background revalidation of {} failed: {err}", request.path),
            }
        });
    }

    async fn handle_network_first(&self, request: FetchRequest) -> Result<CachedResponse, String> {
        match self.network.fetch(request.clone(), CacheMode::Default).await {
            Ok(response) => Ok(response),
            Err(err) => {
                debug!("{} unreachable, trying cache: {err}", request.path);
                self.store
                    .get(self.config.cache_name(), request.path)
                    .await
                    .ok_or(err)
            }
        }
    }
}
