//! The agent's event surface — one method per platform event.
//!
//! The host runtime owns dispatch: it registers the agent, then calls the
//! matching `handle_*` method when an install, activate, fetch, push,
//! click, sync, periodic-sync, or control event arrives. Each handler is
//! sequential internally; the host may run handlers concurrently (a fetch
//! can be served while a push sequence is mid-delay) and keeps a handler
//! alive by awaiting its future.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::agent::config::AgentConfig;
use crate::agent::lifecycle::{ActivateReport, InstallReport, LifecycleManager};
use crate::cache::CacheStore;
use crate::control::{ControlCommand, HostMessage};
use crate::notify::{
    CancelToken, ClickOutcome, DispatchReport, NotificationDispatcher, ScheduledAlerts,
};
use crate::platform::{ClientWindows, Network, Notifier};
use crate::routing::RoutingEngine;
use crate::{CachedResponse, FetchRequest};

/// Where the agent is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    /// Registered but not yet installed.
    Registered,
    /// Install finished; activation pending (normally immediate, because
    /// install requests skip-waiting).
    Installed,
    /// Activated — intercepting traffic for the current generation.
    Active,
}

/// The background agent: cache lifecycle + request routing + notification
/// dispatch + control channel, behind one composition root.
pub struct ServiceAgent {
    config: Arc<AgentConfig>,
    windows: Arc<dyn ClientWindows>,
    lifecycle: LifecycleManager,
    routing: RoutingEngine,
    dispatcher: NotificationDispatcher,
    schedule: ScheduledAlerts,
    phase: Mutex<AgentPhase>,
}

impl ServiceAgent {
    pub fn new(
        config: AgentConfig,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn Network>,
        notifier: Arc<dyn Notifier>,
        windows: Arc<dyn ClientWindows>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            lifecycle: LifecycleManager::new(
                config.clone(),
                store.clone(),
                network.clone(),
                windows.clone(),
            ),
            routing: RoutingEngine::new(config.clone(), store, network),
            dispatcher: NotificationDispatcher::new(
                config.clone(),
                notifier.clone(),
                windows.clone(),
            ),
            schedule: ScheduledAlerts::new(config.clone(), notifier),
            windows,
            config,
            phase: Mutex::new(AgentPhase::Registered),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn phase(&self) -> AgentPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: AgentPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    // ── Lifecycle events ───────────────────────────────────────────

    /// Install: populate the cache, then request immediate activation.
    pub async fn handle_install(&self) -> Result<InstallReport, String> {
        let report = self.lifecycle.on_install().await?;
        self.set_phase(AgentPhase::Installed);
        Ok(report)
    }

    /// Activate: sweep stale generations and claim open pages.
    pub async fn handle_activate(&self) -> Result<ActivateReport, String> {
        let report = self.lifecycle.on_activate().await?;
        self.set_phase(AgentPhase::Active);
        Ok(report)
    }

    // ── Traffic ────────────────────────────────────────────────────

    /// Serve one intercepted request through the routing engine.
    pub async fn handle_fetch(&self, request: FetchRequest) -> Result<CachedResponse, String> {
        self.routing.handle(request).await
    }

    // ── Notifications ──────────────────────────────────────────────

    /// Run the dispatch sequence for one push event. The caller's await is
    /// the "wait until complete" guarantee; `cancel` is the only early
    /// teardown.
    pub async fn handle_push(
        &self,
        raw: Option<&[u8]>,
        cancel: CancelToken,
    ) -> Result<DispatchReport, String> {
        self.dispatcher.dispatch(raw, cancel).await
    }

    /// Route a notification click.
    pub async fn handle_notification_click(
        &self,
        tag: &str,
        action: Option<&str>,
    ) -> Result<ClickOutcome, String> {
        self.dispatcher.handle_click(tag, action).await
    }

    // ── Sync events ────────────────────────────────────────────────

    /// Background sync: on the recognized tag, broadcast `SYNC_MESSAGES`
    /// to every open page so each re-fetches missed messages itself.
    /// Returns the number of pages notified.
    pub async fn handle_sync(&self, tag: &str) -> Result<usize, String> {
        if tag != self.config.sync_tag {
            debug!("ignoring sync event with unknown tag {tag}");
            return Ok(0);
        }

        let mut notified = 0;
        for client in self.windows.clients().await {
            match self
                .windows
                .post_message(client.id.clone(), HostMessage::SyncMessages)
                .await
            {
                Ok(()) => notified += 1,
                Err(err) => warn!("failed to notify client {}: {err}", client.id),
            }
        }
        info!("sync broadcast reached {notified} client(s)");
        Ok(notified)
    }

    /// Periodic sync: on the recognized tag, run the scheduled-alert
    /// check. Returns the tag of the reminder shown, if any.
    pub async fn handle_periodic_sync(&self, tag: &str) -> Result<Option<String>, String> {
        if tag != self.config.periodic_sync_tag {
            debug!("ignoring periodic sync event with unknown tag {tag}");
            return Ok(None);
        }
        self.schedule.check_now().await
    }

    /// Periodic sync against an explicit hour — the deterministic form of
    /// [`handle_periodic_sync`](Self::handle_periodic_sync).
    pub async fn handle_periodic_sync_at(
        &self,
        tag: &str,
        hour: u32,
    ) -> Result<Option<String>, String> {
        if tag != self.config.periodic_sync_tag {
            return Ok(None);
        }
        self.schedule.check_hour(hour).await
    }

    // ── Control channel ────────────────────────────────────────────

    /// Execute one host command.
    pub async fn handle_command(&self, command: ControlCommand) {
        match command {
            ControlCommand::SkipWaiting => {
                info!("host requested immediate activation");
                if let Err(err) = self.handle_activate().await {
                    warn!("skip-waiting activation failed: {err}");
                }
            }
            ControlCommand::ClearCache { reply } => {
                let ack = self.lifecycle.purge_all().await;
                if reply.send(ack).is_err() {
                    debug!("clear-cache requester went away before the ack");
                }
            }
        }
    }

    /// Drain host commands until the channel closes.
    pub async fn run_control_loop(&self, mut rx: mpsc::Receiver<ControlCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle_command(command).await;
        }
        debug!("control channel closed");
    }
}
