//! `courier` — exercise the agent from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Which fetch policy would a path take?
//! courier classify /styles.css
//!
//! # Run install + activate against a real origin and report population.
//! courier warm --origin https://chat.example.com
//!
//! # Drive a push payload through the dispatch sequence (alerts are logged).
//! courier push --payload '{"title": "Hello"}' --count 3 --delay-ms 500
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use courier_rs::prelude::*;

/// Terminal harness for the courier background agent.
#[derive(Parser)]
#[command(about = "Exercise the courier agent: classify paths, warm caches, dispatch pushes")]
struct Args {
    /// Cache version tag for this run.
    #[arg(long, default_value = "v1.0.0")]
    cache_version: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the fetch policy a path would take.
    Classify {
        /// Request path, e.g. `/styles.css`.
        path: String,
    },
    /// Install and activate against an origin, populating the cache.
    Warm {
        /// Origin to fetch assets from, e.g. `https://chat.example.com`.
        #[arg(long)]
        origin: String,
    },
    /// Run a push payload through the dispatch sequence.
    Push {
        /// Raw JSON payload; omitted means an empty push event.
        #[arg(long)]
        payload: Option<String>,
        /// Tickets to present.
        #[arg(long, default_value_t = 3)]
        count: u32,
        /// Delay between tickets, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config = AgentConfig::new(&args.cache_version);

    match args.command {
        Command::Classify { path } => {
            let policy = classify(&path, &config);
            println!("{path} -> {policy}");
        }
        Command::Warm { origin } => {
            let agent = ServiceAgent::new(
                config,
                Arc::new(MemoryCacheStore::new()),
                Arc::new(HttpNetwork::new(origin)?),
                Arc::new(LogNotifier),
                Arc::new(DetachedWindows),
            );
            let install = agent.handle_install().await?;
            let activate = agent.handle_activate().await?;
            println!(
                "warmed: {} cached, {} failed, {} stale generation(s) swept",
                install.cached,
                install.failed,
                activate.deleted.len()
            );
        }
        Command::Push {
            payload,
            count,
            delay_ms,
        } => {
            let config = config
                .with_notify_count(count)
                .with_notify_delay(Duration::from_millis(delay_ms));
            let agent = ServiceAgent::new(
                config,
                Arc::new(MemoryCacheStore::new()),
                Arc::new(HttpNetwork::new("http://localhost")?),
                Arc::new(LogNotifier),
                Arc::new(DetachedWindows),
            );
            let raw = payload.as_deref().map(str::as_bytes);
            let report = agent.handle_push(raw, CancelToken::never()).await?;
            println!("dispatched {} ticket(s): {:?}", report.shown, report.tags);
        }
    }

    Ok(())
}
