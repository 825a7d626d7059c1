//! The host ↔ agent control channel.
//!
//! Host pages send imperative commands to the agent over an mpsc channel;
//! the agent broadcasts [`HostMessage`]s back to every open page through
//! the [`ClientWindows`](crate::platform::ClientWindows) seam. On the wire
//! both directions are JSON objects tagged by a `type` field:
//!
//! | Wire tag | Direction | Payload |
//! |----------|-----------|---------|
//! | `SKIP_WAITING` | host → agent | none |
//! | `CLEAR_CACHE` | host → agent | reply channel: `{"success": bool}` |
//! | `SYNC_MESSAGES` | agent → host | none |

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

// ── Wire types ─────────────────────────────────────────────────────

/// Wire-level discriminator for host → agent commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    SkipWaiting,
    ClearCache,
}

/// Reply sent on the `CLEAR_CACHE` reply channel.
///
/// Per-namespace deletion failures are logged by the agent but not
/// distinguished here; the acknowledgement contract is a single
/// `{"success": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCacheAck {
    pub success: bool,
}

/// A message broadcast from the agent to open pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    /// Connectivity restored — each page should re-fetch missed messages
    /// itself; the agent does not fetch on pages' behalf.
    SyncMessages,
}

// ── In-process command channel ─────────────────────────────────────

/// A host → agent command with its reply channel attached.
#[derive(Debug)]
pub enum ControlCommand {
    /// Skip the normal waiting period and activate immediately.
    SkipWaiting,
    /// Delete every cache namespace, then acknowledge.
    ClearCache { reply: oneshot::Sender<ClearCacheAck> },
}

impl ControlCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            ControlCommand::SkipWaiting => CommandKind::SkipWaiting,
            ControlCommand::ClearCache { .. } => CommandKind::ClearCache,
        }
    }
}

/// Host-side handle for sending commands to a running agent.
#[derive(Clone)]
pub struct ControlChannel {
    tx: mpsc::Sender<ControlCommand>,
}

impl ControlChannel {
    /// Send `SKIP_WAITING`.
    pub async fn skip_waiting(&self) -> Result<(), String> {
        self.tx
            .send(ControlCommand::SkipWaiting)
            .await
            .map_err(|_| "agent control loop is gone".to_string())
    }

    /// Send `CLEAR_CACHE` and wait for the acknowledgement.
    pub async fn clear_cache(&self) -> Result<ClearCacheAck, String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ControlCommand::ClearCache { reply })
            .await
            .map_err(|_| "agent control loop is gone".to_string())?;
        rx.await
            .map_err(|_| "agent dropped the clear-cache reply".to_string())
    }
}

/// Create a control channel pair: the host keeps the [`ControlChannel`],
/// the agent drains the receiver (see
/// [`ServiceAgent::run_control_loop`](crate::agent::worker::ServiceAgent::run_control_loop)).
pub fn control_channel(capacity: usize) -> (ControlChannel, mpsc::Receiver<ControlCommand>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ControlChannel { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_wire_tags() {
        let json = serde_json::to_value(CommandKind::SkipWaiting).unwrap();
        assert_eq!(json["type"], "SKIP_WAITING");
        let json = serde_json::to_value(CommandKind::ClearCache).unwrap();
        assert_eq!(json["type"], "CLEAR_CACHE");

        let parsed: CommandKind = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(parsed, CommandKind::SkipWaiting);
    }

    #[test]
    fn host_message_wire_tag() {
        let json = serde_json::to_value(HostMessage::SyncMessages).unwrap();
        assert_eq!(json["type"], "SYNC_MESSAGES");
    }

    #[test]
    fn clear_cache_ack_shape() {
        let json = serde_json::to_string(&ClearCacheAck { success: true }).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn control_channel_delivers_commands() {
        let (channel, mut rx) = control_channel(4);

        let send = tokio::spawn(async move { channel.skip_waiting().await });
        let cmd = rx.recv().await.unwrap();
        assert_eq!(cmd.kind(), CommandKind::SkipWaiting);
        send.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn clear_cache_round_trips_the_ack() {
        let (channel, mut rx) = control_channel(4);

        let agent = tokio::spawn(async move {
            if let Some(ControlCommand::ClearCache { reply }) = rx.recv().await {
                let _ = reply.send(ClearCacheAck { success: true });
            }
        });

        let ack = channel.clear_cache().await.unwrap();
        assert!(ack.success);
        agent.await.unwrap();
    }
}
