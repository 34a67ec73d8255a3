//! Presence banner and lock modal view models.
//!
//! Pure builders: the reconciler feeds them snapshots and the renderer
//! reads them. Nothing here touches the store or the manager.

use crate::record::{EditLock, RemoteSession};

/// Where the edit-access button is docked: floating in its default spot,
/// or embedded in the presence banner while the banner is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPlacement {
    Floating,
    InBanner,
}

/// Scope line of the presence summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerScope {
    /// Every active session is on the same page.
    OnPage(String),
    /// Active sessions are scattered across pages.
    AcrossDashboard,
}

/// One-line summary of other active sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceBanner {
    pub active_count: usize,
    pub names: Vec<String>,
    pub scope: BannerScope,
}

impl PresenceBanner {
    /// Build the banner from the latest presence snapshot. `None` when no
    /// other session is currently active, which hides the banner.
    #[must_use]
    pub fn from_sessions(sessions: &[RemoteSession]) -> Option<Self> {
        let active: Vec<&RemoteSession> = sessions.iter().filter(|s| s.is_active).collect();
        if active.is_empty() {
            return None;
        }

        let names: Vec<String> = active.iter().map(|s| s.record.name.clone()).collect();
        let first_page = active[0].record.page.as_str();
        let scope = if active.iter().all(|s| s.record.page == first_page) {
            BannerScope::OnPage(first_page.to_owned())
        } else {
            BannerScope::AcrossDashboard
        };

        Some(Self { active_count: active.len(), names, scope })
    }

    /// Render the single-line summary text.
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.active_count == 1 { "other user" } else { "other users" };
        let who = self.names.join(", ");
        match &self.scope {
            BannerScope::OnPage(page) => {
                format!("{} {noun} online on {page}: {who}", self.active_count)
            }
            BannerScope::AcrossDashboard => {
                format!("{} {noun} online across the dashboard: {who}", self.active_count)
            }
        }
    }
}

/// Persistent modal shown while a foreign lock is active. Offers
/// Take Over / Cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockModal {
    pub holder_name: String,
    pub page: String,
    pub message: String,
}

impl LockModal {
    #[must_use]
    pub fn for_lock(lock: &EditLock) -> Self {
        Self {
            holder_name: lock.holder_name.clone(),
            page: lock.page.clone(),
            message: format!(
                "{} is currently editing the dashboard. You can wait, or take over edit access.",
                lock.holder_name
            ),
        }
    }

    /// Fallback when only the holder's name is known, e.g. from a rejected
    /// lock request before the snapshot lands.
    #[must_use]
    pub fn for_holder(holder_name: &str) -> Self {
        Self {
            holder_name: holder_name.to_owned(),
            page: String::new(),
            message: format!(
                "{holder_name} is currently editing the dashboard. You can wait, or take over edit access."
            ),
        }
    }
}

#[cfg(test)]
#[path = "banner_test.rs"]
mod tests;
