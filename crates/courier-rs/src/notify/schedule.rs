//! Time-of-day reminder alerts driven by periodic sync.

use std::sync::Arc;

use chrono::{Local, Timelike};
use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::platform::Notifier;

use super::Ticket;

/// Tag of the morning reminder ticket.
pub const MORNING_TAG: &str = "morning-reminder";
/// Tag of the evening reminder ticket.
pub const EVENING_TAG: &str = "evening-reminder";

/// Presents a single fixed-copy alert when the wall clock matches one of
/// two configured hours.
///
/// No state is carried between wake-ups beyond the clock check itself, so
/// a missed wake-up silently skips that day's reminder — there is no
/// catch-up.
pub struct ScheduledAlerts {
    config: Arc<AgentConfig>,
    notifier: Arc<dyn Notifier>,
}

impl ScheduledAlerts {
    pub fn new(config: Arc<AgentConfig>, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    /// Check against the local wall clock.
    pub async fn check_now(&self) -> Result<Option<String>, String> {
        self.check_hour(Local::now().hour()).await
    }

    /// Check against an explicit hour (0-23). Returns the tag of the
    /// reminder shown, if any.
    pub async fn check_hour(&self, hour: u32) -> Result<Option<String>, String> {
        let schedule = &self.config.schedule;
        let (tag, body) = if hour == schedule.morning_hour {
            (MORNING_TAG, schedule.morning_body.clone())
        } else if hour == schedule.evening_hour {
            (EVENING_TAG, schedule.evening_body.clone())
        } else {
            debug!("no scheduled reminder for hour {hour}");
            return Ok(None);
        };

        self.notifier
            .show(Ticket {
                title: self.config.notify.default_title.clone(),
                body,
                tag: tag.to_string(),
                icon: self.config.notify.icon.clone(),
                data: serde_json::Value::Null,
                actions: Vec::new(),
            })
            .await?;
        Ok(Some(tag.to_string()))
    }
}
