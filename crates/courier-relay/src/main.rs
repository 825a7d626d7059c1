//! Push relay server — fan one send request out to every recipient.
//!
//! # Usage
//!
//! ```bash
//! COURIER_VAPID_PUBLIC_KEY=... COURIER_VAPID_PRIVATE_KEY=... cargo run -p courier-relay
//! cargo run -p courier-relay -- --port 9000
//! ```
//!
//! Then send:
//!
//! ```bash
//! curl -X POST http://127.0.0.1:8787/api/push \
//!   -H 'Content-Type: application/json' \
//!   -d '{"chatId":"c1","senderId":"u1","senderName":"Ada",
//!        "messageText":"hi","recipients":[{"endpoint":"https://push.example/sub"}]}'
//! ```

use std::sync::Arc;

use clap::Parser;
use courier_relay::{HttpPushSender, RelayConfig, spawn_relay};

/// Push fan-out relay.
#[derive(Parser)]
#[command(about = "Relay that fans application messages out as push notifications")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config = RelayConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
        ..RelayConfig::from_env()
    };
    if config.signing.is_none() {
        eprintln!("warning: VAPID keys not configured — every send will fail with 500");
    }

    let sender = Arc::new(HttpPushSender::new()?);
    let addr = spawn_relay(config, sender).await?;
    println!("Relay: http://{addr}");

    // Serve until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to wait for shutdown signal: {e}"))?;
    Ok(())
}
