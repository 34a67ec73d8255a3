//! Toast notifications with auto-expiry.
//!
//! DESIGN
//! ======
//! Toasts are the only transient surface: every state transition and every
//! failure produces one, and each expires after a short TTL. Expired
//! entries are pruned lazily from the front of the queue on read, which
//! works because pushes arrive in time order.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

/// Toast category; the renderer maps this to a background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    /// Expiry, ms since epoch.
    pub expires_at: i64,
}

/// Bounded queue of live toasts.
pub struct NotificationSink {
    ttl_ms: i64,
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationSink {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, severity: Severity, message: &str, now: i64) {
        debug!(?severity, message, "notification");
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Notification {
                severity,
                message: message.to_owned(),
                expires_at: now.saturating_add(self.ttl_ms),
            });
    }

    /// Live notifications at `now`, pruning expired ones.
    #[must_use]
    pub fn active(&self, now: i64) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(front) = queue.front() {
            if front.expires_at <= now {
                queue.pop_front();
            } else {
                break;
            }
        }
        queue.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
