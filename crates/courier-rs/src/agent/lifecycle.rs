//! Cache generation lifecycle: install-time population, activation-time
//! sweep, and full purge.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::config::AgentConfig;
use crate::cache::CacheStore;
use crate::control::ClearCacheAck;
use crate::platform::{ClientWindows, Network};
use crate::{CacheMode, FetchRequest};

/// What install-time population achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Assets cached successfully.
    pub cached: usize,
    /// Assets that could not be fetched or stored. Install tolerates
    /// these — a single missing icon must not brick the update.
    pub failed: usize,
}

/// What activation reclaimed and claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale namespaces deleted.
    pub deleted: Vec<String>,
    /// Open pages now controlled by this generation.
    pub claimed: usize,
}

/// Owns cache creation, population, and garbage collection of stale
/// generations; gates when the agent starts intercepting traffic.
pub struct LifecycleManager {
    config: Arc<AgentConfig>,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    windows: Arc<dyn ClientWindows>,
}

impl LifecycleManager {
    pub fn new(
        config: Arc<AgentConfig>,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn Network>,
        windows: Arc<dyn ClientWindows>,
    ) -> Self {
        Self {
            config,
            store,
            network,
            windows,
        }
    }

    /// Populate the current generation's namespace with the static asset
    /// set. Partial failure is logged and tolerated; install concludes by
    /// requesting immediate activation (the skip-waiting tradeoff: a small
    /// risk of version-mixing mid-session for faster rollout).
    pub async fn on_install(&self) -> Result<InstallReport, String> {
        let namespace = self.config.cache_name();
        info!("installing cache generation {namespace}");

        let mut cached = 0;
        let mut failed = 0;
        for path in &self.config.static_assets {
            match self
                .network
                .fetch(FetchRequest::get(path), CacheMode::Default)
                .await
            {
                Ok(response) => {
                    match self
                        .store
                        .put(namespace.clone(), path.clone(), response)
                        .await
                    {
                        Ok(()) => cached += 1,
                        Err(err) => {
                            warn!("failed to store {path}: {err}");
                            failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!("failed to cache {path}: {err}");
                    failed += 1;
                }
            }
        }

        info!("install complete: {cached} cached, {failed} failed; skipping waiting");
        Ok(InstallReport { cached, failed })
    }

    /// Mark-and-sweep with exactly one root: delete every namespace whose
    /// name is not the current generation, then claim open pages so they
    /// are served by this generation without a reload.
    ///
    /// After this returns, the store holds at most one version's entries.
    pub async fn on_activate(&self) -> Result<ActivateReport, String> {
        let current = self.config.cache_name();
        info!("activating cache generation {current}");

        let mut deleted = Vec::new();
        for namespace in self.store.namespaces().await {
            if namespace == current {
                continue;
            }
            match self.store.delete_namespace(namespace.clone()).await {
                Ok(_) => {
                    info!("deleted stale cache namespace {namespace}");
                    deleted.push(namespace);
                }
                Err(err) => warn!("failed to delete stale namespace {namespace}: {err}"),
            }
        }

        let mut claimed = 0;
        for client in self.windows.clients().await {
            match self.windows.claim(client.id.clone()).await {
                Ok(()) => claimed += 1,
                Err(err) => warn!("failed to claim client {}: {err}", client.id),
            }
        }

        Ok(ActivateReport { deleted, claimed })
    }

    /// Delete every namespace, current generation included.
    ///
    /// The acknowledgement is a single unconditional success; individual
    /// failures are logged per namespace rather than silently dropped.
    pub async fn purge_all(&self) -> ClearCacheAck {
        for namespace in self.store.namespaces().await {
            if let Err(err) = self.store.delete_namespace(namespace.clone()).await {
                warn!("failed to delete cache namespace {namespace}: {err}");
            }
        }
        ClearCacheAck { success: true }
    }
}
