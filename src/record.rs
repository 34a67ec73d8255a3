//! Presence and lock record types.
//!
//! DESIGN
//! ======
//! All timestamps are milliseconds since the Unix epoch, assigned by the
//! backing store on write. Liveness is judged from timestamps, never from
//! record existence: an unload hook that never ran leaves a record behind,
//! and the freshness window reclassifies it as inactive.
//!
//! Lock ownership is keyed on session id. The holder's display name is
//! carried alongside for messages only, so two tabs sharing a name cannot
//! mistake each other's lock for their own.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// PRESENCE RECORD
// =============================================================================

/// Liveness beacon for one session. Upserted on every heartbeat, deleted
/// best-effort on shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Durable per-browser-profile identity, persisted locally.
    pub session_id: Uuid,
    /// Display name. Best-effort, not guaranteed unique.
    pub name: String,
    /// Page/route the session currently has open.
    pub page: String,
    /// Store-assigned write timestamp, ms since epoch.
    pub last_active: i64,
}

impl PresenceRecord {
    /// Whether this session counts as live at `now`. A record older than
    /// the freshness window is inactive even if still present in storage.
    #[must_use]
    pub fn is_active(&self, now: i64, window_ms: i64) -> bool {
        now.saturating_sub(self.last_active) <= window_ms
    }
}

/// A remote session as one manager sees it: the raw record plus the
/// freshness classification derived at snapshot time.
#[derive(Debug, Clone)]
pub struct RemoteSession {
    pub record: PresenceRecord,
    pub is_active: bool,
}

// =============================================================================
// EDIT LOCK
// =============================================================================

/// The single global advisory edit lock. Absence means "unlocked".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditLock {
    /// Session that holds the lock.
    pub locked_by: Uuid,
    /// Holder's display name, used only in user-facing messages.
    pub holder_name: String,
    /// Store-assigned acquisition timestamp, ms since epoch.
    pub locked_at: i64,
    /// Page the lock was acquired from.
    pub page: String,
}

impl EditLock {
    /// A lock whose holder has not renewed within the window may be
    /// unilaterally overwritten by any requester.
    #[must_use]
    pub fn is_stale(&self, now: i64, window_ms: i64) -> bool {
        now.saturating_sub(self.locked_at) > window_ms
    }

    #[must_use]
    pub fn is_held_by(&self, session_id: Uuid) -> bool {
        self.locked_by == session_id
    }
}

// =============================================================================
// LOCK ATTEMPT
// =============================================================================

/// Outcome of a lock request. Failures are values, never errors: callers
/// branch on `granted` and surface `message` to the user.
#[derive(Debug, Clone)]
pub struct LockAttempt {
    pub granted: bool,
    pub message: String,
    /// Display name of the current holder when the request was rejected
    /// because the lock is fresh.
    pub held_by: Option<String>,
}

impl LockAttempt {
    pub(crate) fn granted(message: impl Into<String>) -> Self {
        Self { granted: true, message: message.into(), held_by: None }
    }

    pub(crate) fn rejected(message: impl Into<String>, held_by: Option<String>) -> Self {
        Self { granted: false, message: message.into(), held_by }
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
