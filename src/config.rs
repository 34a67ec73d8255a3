//! Presence timing configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! One knob drives the timing model: the heartbeat interval. The staleness
//! window used for both presence freshness and lock takeover is defined as
//! `heartbeat * PRESENCE_STALENESS_MULTIPLE` so the two can never drift
//! apart. Defaults: 20s heartbeat, x6 multiple, 120s window.

use std::time::Duration;

pub const DEFAULT_HEARTBEAT_SECS: u64 = 20;
pub const DEFAULT_HIDDEN_HEARTBEAT_SECS: u64 = 60;
pub const DEFAULT_STALENESS_MULTIPLE: u32 = 6;
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 3;

/// Timing knobs shared by the manager and the UI.
#[derive(Debug, Clone, Copy)]
pub struct PresenceConfig {
    /// Heartbeat cadence while the session is foregrounded.
    pub heartbeat: Duration,
    /// Reduced cadence while the session is hidden.
    pub hidden_heartbeat: Duration,
    /// Freshness window for presence records and lock staleness.
    pub staleness_window: Duration,
    /// How long toast notifications stay visible.
    pub notification_ttl: Duration,
}

impl PresenceConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// - `PRESENCE_HEARTBEAT_SECS`: default 20
    /// - `PRESENCE_HIDDEN_HEARTBEAT_SECS`: default 60
    /// - `PRESENCE_STALENESS_MULTIPLE`: default 6
    /// - `NOTIFICATION_TTL_SECS`: default 3
    #[must_use]
    pub fn from_env() -> Self {
        let heartbeat = Duration::from_secs(env_parse("PRESENCE_HEARTBEAT_SECS", DEFAULT_HEARTBEAT_SECS));
        let hidden = Duration::from_secs(env_parse("PRESENCE_HIDDEN_HEARTBEAT_SECS", DEFAULT_HIDDEN_HEARTBEAT_SECS));
        let multiple = env_parse("PRESENCE_STALENESS_MULTIPLE", DEFAULT_STALENESS_MULTIPLE);
        let ttl = Duration::from_secs(env_parse("NOTIFICATION_TTL_SECS", DEFAULT_NOTIFICATION_TTL_SECS));
        Self::with_heartbeat(heartbeat, hidden, multiple, ttl)
    }

    /// Build config from an explicit heartbeat, deriving the staleness
    /// window as `heartbeat * staleness_multiple`.
    #[must_use]
    pub fn with_heartbeat(
        heartbeat: Duration,
        hidden_heartbeat: Duration,
        staleness_multiple: u32,
        notification_ttl: Duration,
    ) -> Self {
        Self {
            heartbeat,
            hidden_heartbeat,
            staleness_window: heartbeat * staleness_multiple,
            notification_ttl,
        }
    }

    /// Staleness window in store-timestamp milliseconds.
    #[must_use]
    pub fn staleness_window_ms(&self) -> i64 {
        i64::try_from(self.staleness_window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Notification lifetime in milliseconds.
    #[must_use]
    pub fn notification_ttl_ms(&self) -> i64 {
        i64::try_from(self.notification_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self::with_heartbeat(
            Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            Duration::from_secs(DEFAULT_HIDDEN_HEARTBEAT_SECS),
            DEFAULT_STALENESS_MULTIPLE,
            Duration::from_secs(DEFAULT_NOTIFICATION_TTL_SECS),
        )
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
