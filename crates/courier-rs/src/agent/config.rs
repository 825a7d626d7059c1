//! Configuration for the [`ServiceAgent`](super::worker::ServiceAgent).
//!
//! Everything that was ambient global state in a typical worker script —
//! the cache version tag, the static asset manifest, sequence pacing,
//! scheduled alert hours, sync tags — is an explicit immutable value here,
//! injected into each component at construction.
//!
//! # Examples
//!
//! Minimal configuration — everything uses defaults:
//!
//! ```
//! use courier_rs::agent::config::AgentConfig;
//!
//! let config = AgentConfig::new("v1.0.0");
//! assert_eq!(config.cache_name(), "courier-cache-v1.0.0");
//! ```
//!
//! Customized configuration with builder methods:
//!
//! ```
//! use courier_rs::agent::config::AgentConfig;
//! use std::time::Duration;
//!
//! let config = AgentConfig::new("v2.1.0")
//!     .with_static_assets(["/styles.css", "/manifest.json"])
//!     .with_notify_count(5)
//!     .with_notify_delay(Duration::from_millis(500));
//! ```

use std::time::Duration;

// ── Agent config ───────────────────────────────────────────────────

/// Immutable configuration shared by every agent component.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Version tag for the current cache generation. Baked in at deploy
    /// time; changing it is what retires the previous generation.
    pub cache_version: String,
    /// Prefix joined with `cache_version` to form the namespace name.
    pub cache_prefix: String,
    /// Same-origin paths cached at install time. The entry document is
    /// deliberately absent so it is never served stale.
    pub static_assets: Vec<String>,
    /// Requests under this prefix also take the static-asset policy.
    pub icon_prefix: String,
    /// The site root path.
    pub root_path: String,
    /// The entry HTML document, also the offline fallback for the root.
    pub entry_document: String,
    /// Scope prefix used to match open page clients on notification click.
    pub scope: String,
    /// Notification sequence settings.
    pub notify: NotifyConfig,
    /// Time-of-day reminder settings.
    pub schedule: ScheduleConfig,
    /// Background-sync registration tag that triggers the sync broadcast.
    pub sync_tag: String,
    /// Periodic-sync registration tag that triggers the schedule check.
    pub periodic_sync_tag: String,
}

impl AgentConfig {
    /// Create a configuration for the given cache version with defaults
    /// for everything else.
    pub fn new(cache_version: impl Into<String>) -> Self {
        Self {
            cache_version: cache_version.into(),
            ..Self::default()
        }
    }

    /// The full cache namespace name for the current generation.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    pub fn with_static_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notify_count(mut self, count: u32) -> Self {
        self.notify.count = count;
        self
    }

    pub fn with_notify_delay(mut self, delay: Duration) -> Self {
        self.notify.delay = delay;
        self
    }

    pub fn with_schedule_hours(mut self, morning: u32, evening: u32) -> Self {
        self.schedule.morning_hour = morning;
        self.schedule.evening_hour = evening;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_version: "v1.0.0".to_string(),
            cache_prefix: "courier-cache".to_string(),
            static_assets: vec![
                "/styles.css".to_string(),
                "/manifest.json".to_string(),
                "/icons/icon-192.png".to_string(),
                "/icons/icon-512.png".to_string(),
            ],
            icon_prefix: "/icons/".to_string(),
            root_path: "/".to_string(),
            entry_document: "/index.html".to_string(),
            scope: "/".to_string(),
            notify: NotifyConfig::default(),
            schedule: ScheduleConfig::default(),
            sync_tag: "sync-messages".to_string(),
            periodic_sync_tag: "check-scheduled-notifications".to_string(),
        }
    }
}

// ── Notification config ────────────────────────────────────────────

/// Sequence shape and default copy for push-driven alerts.
///
/// `count` and `delay` bound resource use from untrusted input: a payload
/// can change the text of an alert but never how many are shown or how
/// fast.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Tickets presented per push event.
    pub count: u32,
    /// Pause between consecutive tickets.
    pub delay: Duration,
    /// Title used when the payload carries neither a title nor a sender.
    pub default_title: String,
    /// Body used when the payload carries none.
    pub default_body: String,
    /// Tag prefix; ticket `i` is tagged `{base_tag}-{i}` so the tray does
    /// not collapse the sequence into one alert.
    pub base_tag: String,
    /// Icon path attached to every ticket.
    pub icon: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            count: 3,
            delay: Duration::from_secs(1),
            default_title: "Courier".to_string(),
            default_body: "You have a new message".to_string(),
            base_tag: "courier-message".to_string(),
            icon: "/icons/icon-192.png".to_string(),
        }
    }
}

// ── Schedule config ────────────────────────────────────────────────

/// Fixed-copy reminders keyed to two wall-clock hours.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Hour (0-23) of the morning reminder.
    pub morning_hour: u32,
    /// Hour (0-23) of the evening reminder.
    pub evening_hour: u32,
    pub morning_body: String,
    pub evening_body: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning_hour: 9,
            evening_hour: 18,
            morning_body: "Good morning! Check your messages".to_string(),
            evening_body: "Good evening! You might have new messages".to_string(),
        }
    }
}
