//! Push fan-out relay for courier-rs agents.
//!
//! `courier-relay` is the server-side counterpart of the background agent:
//! an axum service that accepts one send request from the application and
//! fans it out as one push message per recipient subscription. The agent's
//! [`PushPayload`](courier_rs::notify::PushPayload) is the wire contract
//! between the two.
//!
//! # Quick start
//!
//! ```ignore
//! use courier_relay::{HttpPushSender, RelayConfig, spawn_relay};
//! use std::sync::Arc;
//!
//! let config = RelayConfig::from_env();
//! let addr = spawn_relay(config, Arc::new(HttpPushSender::new()?)).await?;
//! println!("Relay: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! App ──POST /api/push──▶ api::send_push ──payload──▶ PushSender ──▶ per-recipient endpoint
//!                              │
//!                              └── 400 no recipients / 500 no signing keys / 200 {sent}
//! ```
//!
//! Delivery failures are isolated per recipient and never fail the batch;
//! the reported `sent` count reflects *attempted* deliveries.

pub mod api;
mod sender;
mod server;

pub use api::{SendRequest, SendResponse, Subscription, SubscriptionKeys};
pub use sender::{HttpPushSender, PushSender, SendFuture};

use std::net::SocketAddr;
use std::sync::Arc;

/// Keys whose presence gates a send request.
///
/// Payload encryption and transport authentication belong to the push
/// service integration, not this relay; here the keys are configuration
/// that must exist before any delivery is attempted.
#[derive(Debug, Clone)]
pub struct SigningKeys {
    pub public_key: String,
    pub private_key: String,
    /// Contact address advertised to the push service.
    pub contact: String,
}

impl SigningKeys {
    /// Load from `COURIER_VAPID_PUBLIC_KEY` / `COURIER_VAPID_PRIVATE_KEY`
    /// (and optionally `COURIER_VAPID_CONTACT`). Returns `None` when either
    /// key is absent.
    pub fn from_env() -> Option<Self> {
        let public_key = std::env::var("COURIER_VAPID_PUBLIC_KEY").ok()?;
        let private_key = std::env::var("COURIER_VAPID_PRIVATE_KEY").ok()?;
        let contact = std::env::var("COURIER_VAPID_CONTACT")
            .unwrap_or_else(|_| "mailto:ops@courier.example".to_string());
        Some(Self {
            public_key,
            private_key,
            contact,
        })
    }
}

/// Configuration for the relay server.
pub struct RelayConfig {
    /// Address to bind to. Default: `127.0.0.1:8787`.
    pub bind_addr: SocketAddr,
    /// Signing configuration; `None` makes every send fail with 500.
    pub signing: Option<SigningKeys>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            signing: None,
        }
    }
}

impl RelayConfig {
    /// Default addresses plus signing keys from the environment.
    pub fn from_env() -> Self {
        Self {
            signing: SigningKeys::from_env(),
            ..Self::default()
        }
    }
}

/// Spawn the relay server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_relay(
    config: RelayConfig,
    sender: Arc<dyn PushSender>,
) -> Result<SocketAddr, String> {
    let router = server::build_router(api::AppState {
        sender,
        signing: config.signing.map(Arc::new),
    });
    server::start_server(router, config.bind_addr).await
}
