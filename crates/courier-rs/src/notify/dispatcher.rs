//! The sequenced dispatch state machine and click routing.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::agent::config::AgentConfig;
use crate::platform::{ClientWindows, Notifier};

use super::{ACTION_CLOSE, PushPayload, Ticket};

// ── Cancellation ───────────────────────────────────────────────────

/// Cancel side of a dispatch sequence.
///
/// Dropping the handle does *not* cancel — an abandoned handle leaves the
/// sequence running to completion, matching the platform's "wait until
/// done" guarantee.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Stop the sequence before its next ticket.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observe side of a dispatch sequence's cancellation.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never be cancelled.
    pub fn never() -> Self {
        let (_, token) = cancel_pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancelled; pend forever if the handle is gone.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked cancel handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

// ── Dispatch state machine ─────────────────────────────────────────

/// Observable state of one dispatch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Parsed,
    /// Presenting ticket `i` (1-based) of the configured count.
    Presenting(u32),
    Done,
    Cancelled,
}

/// What a dispatch sequence did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Tickets actually shown.
    pub shown: u32,
    /// Terminal state: [`DispatchState::Done`] or [`DispatchState::Cancelled`].
    pub state: DispatchState,
    /// Tags of the shown tickets, in order.
    pub tags: Vec<String>,
}

/// Where a notification click landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A close-only action: the ticket was dismissed, nothing else.
    Dismissed,
    /// An already-open page was focused.
    Focused(String),
    /// No page was open; a new window was opened at the root path.
    Opened,
}

/// Turns one push event into a paced run of tickets, and routes clicks.
///
/// Sequence shape (`count`, `delay`, tags) comes from
/// [`NotifyConfig`](crate::agent::config::NotifyConfig); the payload only
/// contributes text. The sequence runs inside the caller's future — the
/// host keeps the agent alive by awaiting [`dispatch`](Self::dispatch),
/// and tears it down early only through the [`CancelToken`].
pub struct NotificationDispatcher {
    config: Arc<AgentConfig>,
    notifier: Arc<dyn Notifier>,
    windows: Arc<dyn ClientWindows>,
}

impl NotificationDispatcher {
    pub fn new(
        config: Arc<AgentConfig>,
        notifier: Arc<dyn Notifier>,
        windows: Arc<dyn ClientWindows>,
    ) -> Self {
        Self {
            config,
            notifier,
            windows,
        }
    }

    /// Run the full state machine for one push event:
    /// `Received → Parsed → Presenting(1..=N) → Done`.
    ///
    /// Decode failure never fails the event — it degrades to the default
    /// copy. Title and body are derived once and fixed for the whole
    /// sequence; each ticket gets a distinct `{base_tag}-{i}` tag so the
    /// tray does not collapse the run.
    pub async fn dispatch(
        &self,
        raw: Option<&[u8]>,
        mut cancel: CancelToken,
    ) -> Result<DispatchReport, String> {
        // Received -> Parsed
        let payload = PushPayload::decode(raw);
        let title = self.title_for(&payload);
        let body = payload
            .body
            .clone()
            .unwrap_or_else(|| self.config.notify.default_body.clone());
        let data = payload.data.clone().unwrap_or(serde_json::Value::Null);
        let notify = &self.config.notify;

        let mut tags = Vec::with_capacity(notify.count as usize);
        for i in 0..notify.count {
            if cancel.is_cancelled() {
                debug!("dispatch sequence cancelled before ticket {}", i + 1);
                return Ok(DispatchReport {
                    shown: i,
                    state: DispatchState::Cancelled,
                    tags,
                });
            }

            // Parsed -> Presenting(i) / Presenting(i) -> Presenting(i+1)
            let tag = format!("{}-{i}", notify.base_tag);
            let ticket = Ticket {
                title: title.clone(),
                body: body.clone(),
                tag: tag.clone(),
                icon: notify.icon.clone(),
                data: data.clone(),
                actions: payload.actions.clone(),
            };
            self.notifier.show(ticket).await?;
            tags.push(tag);
            info!("presented ticket {}/{}", i + 1, notify.count);

            if i + 1 < notify.count {
                tokio::select! {
                    _ = tokio::time::sleep(notify.delay) => {}
                    _ = cancel.cancelled() => {
                        debug!("dispatch sequence cancelled mid-delay");
                        return Ok(DispatchReport {
                            shown: i + 1,
                            state: DispatchState::Cancelled,
                            tags,
                        });
                    }
                }
            }
        }

        // Presenting(N) -> Done
        Ok(DispatchReport {
            shown: notify.count,
            state: DispatchState::Done,
            tags,
        })
    }

    fn title_for(&self, payload: &PushPayload) -> String {
        if let Some(title) = &payload.title {
            return title.clone();
        }
        if let Some(sender) = payload.sender_name() {
            return format!("New message from {sender}");
        }
        self.config.notify.default_title.clone()
    }

    /// Route one notification click. Stateless per click.
    ///
    /// The platform has already dismissed the ticket; a `close` action ends
    /// there. Any other (or absent) action focuses the first open
    /// same-scope page, or opens exactly one new window at the root path
    /// when none is open.
    pub async fn handle_click(
        &self,
        tag: &str,
        action: Option<&str>,
    ) -> Result<ClickOutcome, String> {
        debug!("notification click on {tag}, action {action:?}");
        if action == Some(ACTION_CLOSE) {
            return Ok(ClickOutcome::Dismissed);
        }

        let clients = self.windows.clients().await;
        if let Some(client) = clients.iter().find(|c| c.url.contains(&self.config.scope)) {
            self.windows.focus(client.id.clone()).await?;
            return Ok(ClickOutcome::Focused(client.id.clone()));
        }

        self.windows.open_window(self.config.root_path.clone()).await?;
        Ok(ClickOutcome::Opened)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::platform::fakes::{FakeWindows, RecordingNotifier};

    fn dispatcher(
        config: AgentConfig,
    ) -> (
        NotificationDispatcher,
        Arc<RecordingNotifier>,
        Arc<FakeWindows>,
    ) {
        let notifier = Arc::new(RecordingNotifier::new());
        let windows = Arc::new(FakeWindows::new());
        let dispatcher =
            NotificationDispatcher::new(Arc::new(config), notifier.clone(), windows.clone());
        (dispatcher, notifier, windows)
    }

    fn quick_config() -> AgentConfig {
        AgentConfig::default().with_notify_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn empty_payload_uses_configured_defaults() {
        let (dispatcher, notifier, _) = dispatcher(quick_config());

        let report = dispatcher
            .dispatch(Some(b"{}"), CancelToken::never())
            .await
            .unwrap();

        assert_eq!(report.state, DispatchState::Done);
        assert_eq!(report.shown, 3);
        let shown = notifier.shown();
        assert_eq!(shown.len(), 3);
        for ticket in &shown {
            assert_eq!(ticket.title, "Courier");
            assert_eq!(ticket.body, "You have a new message");
        }
    }

    #[tokio::test]
    async fn payload_title_is_shared_but_tags_differ() {
        let (dispatcher, notifier, _) = dispatcher(quick_config());

        let report = dispatcher
            .dispatch(Some(br#"{"title": "X"}"#), CancelToken::never())
            .await
            .unwrap();

        let shown = notifier.shown();
        assert!(shown.iter().all(|t| t.title == "X"));
        let mut tags = report.tags.clone();
        tags.dedup();
        assert_eq!(tags.len(), 3, "tags must be distinct");
        assert_eq!(tags[0], "courier-message-0");
    }

    #[tokio::test]
    async fn sender_name_derives_title() {
        let (dispatcher, notifier, _) = dispatcher(quick_config());

        dispatcher
            .dispatch(
                Some(br#"{"data": {"senderName": "Ada"}}"#),
                CancelToken::never(),
            )
            .await
            .unwrap();

        assert_eq!(notifier.shown()[0].title, "New message from Ada");
    }

    #[tokio::test]
    async fn malformed_payload_still_presents_sequence() {
        let (dispatcher, notifier, _) = dispatcher(quick_config());

        let report = dispatcher
            .dispatch(Some(b"\x00\xffnope"), CancelToken::never())
            .await
            .unwrap();

        assert_eq!(report.state, DispatchState::Done);
        assert_eq!(notifier.shown().len(), 3);
    }

    #[tokio::test]
    async fn sequence_length_ignores_payload() {
        let config = quick_config().with_notify_count(2);
        let (dispatcher, notifier, _) = dispatcher(config);

        dispatcher
            .dispatch(Some(br#"{"count": 50}"#), CancelToken::never())
            .await
            .unwrap();

        assert_eq!(notifier.shown().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_stops_the_sequence_early() {
        let config = AgentConfig::default().with_notify_delay(Duration::from_secs(30));
        let (dispatcher, notifier, _) = dispatcher(config);
        let (handle, token) = cancel_pair();

        let dispatch = dispatcher.dispatch(Some(b"{}"), token);
        tokio::pin!(dispatch);

        // Let the first ticket show, then cancel during the long delay.
        let report = tokio::select! {
            r = &mut dispatch => r,
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                handle.cancel();
                dispatch.await
            }
        }
        .unwrap();

        assert_eq!(report.state, DispatchState::Cancelled);
        assert_eq!(report.shown, 1);
        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test]
    async fn click_focuses_existing_client_without_opening() {
        let (dispatcher, _, windows) = {
            let notifier = Arc::new(RecordingNotifier::new());
            let windows = Arc::new(FakeWindows::new().with_client("c1", "https://app.test/chat"));
            (
                NotificationDispatcher::new(
                    Arc::new(quick_config()),
                    notifier.clone(),
                    windows.clone(),
                ),
                notifier,
                windows,
            )
        };

        let outcome = dispatcher
            .handle_click("courier-message-0", None)
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Focused("c1".into()));
        assert_eq!(windows.focused(), vec!["c1"]);
        assert!(windows.opened().is_empty());
    }

    #[tokio::test]
    async fn click_with_no_client_opens_one_window_at_root() {
        let (dispatcher, _, windows) = dispatcher(quick_config());

        let outcome = dispatcher
            .handle_click("courier-message-1", Some("open"))
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Opened);
        assert_eq!(windows.opened(), vec!["/"]);
        assert!(windows.focused().is_empty());
    }

    #[tokio::test]
    async fn close_action_performs_no_window_operation() {
        let (dispatcher, _, windows) = dispatcher(quick_config());

        let outcome = dispatcher
            .handle_click("courier-message-0", Some("close"))
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Dismissed);
        assert!(windows.focused().is_empty());
        assert!(windows.opened().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_behaves_as_open() {
        let (dispatcher, _, windows) = dispatcher(quick_config());

        let outcome = dispatcher
            .handle_click("courier-message-0", Some("reply"))
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Opened);
        assert_eq!(windows.opened().len(), 1);
    }
}
