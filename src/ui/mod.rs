//! Presence UI — headless reconciliation of lock state into view models.
//!
//! DESIGN
//! ======
//! Owns no coordination logic; it only reacts to `PresenceManager`
//! callbacks. Construction blocks interaction synchronously (startup
//! overlay up, editing disabled) so there is no window where a user can
//! touch a control before the lock state is known; the startup overlay
//! comes down only after `initialize` completes.
//!
//! Gating is enforced two ways at once: every interaction routes through
//! `handle_interaction`, and every registered control's enabled flag is
//! rewritten on lock-state change. An `editing_enabled` watch channel
//! mirrors the gate for components that react to keyboard or programmatic
//! input rather than clicks.
//!
//! ERROR HANDLING
//! ==============
//! Every async action converts both structured failures and store errors
//! into a toast; a failed takeover leaves the modal open. The UI is never
//! left stuck mid-action.

pub mod banner;
pub mod controls;
pub mod notify;

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::sync::watch;

use crate::config::PresenceConfig;
use crate::manager::PresenceManager;
use crate::record::{EditLock, RemoteSession, now_ms};
use banner::{ButtonPlacement, LockModal, PresenceBanner};
use controls::{ControlKind, ControlRegistry};
use notify::{Notification, NotificationSink, Severity};

/// Control ids of the presence chrome. Registered as ungated so the
/// lock-request path stays usable while everything else is blocked.
pub const ACCESS_BUTTON_ID: &str = "presence-access-button";
pub const MODAL_TAKE_OVER_ID: &str = "presence-modal-take-over";
pub const MODAL_CANCEL_ID: &str = "presence-modal-cancel";

/// Full-viewport overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Opaque blocker while the initial lock state is unknown.
    Startup,
    /// Translucent "not clickable" layer while editing is disabled. Lets
    /// presence chrome through.
    EditBlocked,
    Hidden,
}

/// UI-visible lock state machine. Driven purely by incoming snapshots;
/// staleness is judged only inside the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockPhase {
    Unknown,
    Unlocked,
    LockedBySelf,
    LockedByOther { holder_name: String },
}

/// Result of routing one interaction through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Allowed,
    Blocked,
}

// =============================================================================
// PRESENCE UI
// =============================================================================

/// Headless UI handle. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct PresenceUi {
    inner: Arc<UiShared>,
}

struct UiShared {
    state: Mutex<UiState>,
    controls: ControlRegistry,
    notifications: NotificationSink,
    editing_tx: watch::Sender<bool>,
    manager: OnceLock<PresenceManager>,
}

struct UiState {
    phase: LockPhase,
    overlay: Overlay,
    banner: Option<PresenceBanner>,
    modal: Option<LockModal>,
    button: ButtonPlacement,
    initialized: bool,
}

impl PresenceUi {
    /// Construct with interaction already blocked: startup overlay up,
    /// editing disabled. No async work happens here.
    #[must_use]
    pub fn new(config: PresenceConfig) -> Self {
        let (editing_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(UiShared {
                state: Mutex::new(UiState {
                    phase: LockPhase::Unknown,
                    overlay: Overlay::Startup,
                    banner: None,
                    modal: None,
                    button: ButtonPlacement::Floating,
                    initialized: false,
                }),
                controls: ControlRegistry::new(),
                notifications: NotificationSink::new(config.notification_ttl),
                editing_tx,
                manager: OnceLock::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, UiState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Wire the UI to a manager: register chrome, apply the safe-default
    /// disable sweep, start the manager, subscribe to both callback slots,
    /// and finally drop the startup overlay. Idempotent.
    pub async fn initialize(&self, manager: PresenceManager) {
        {
            let mut state = self.state();
            if state.initialized {
                return;
            }
            state.initialized = true;
        }

        self.inner.controls.register(ACCESS_BUTTON_ID, ControlKind::PresenceChrome);
        self.inner.controls.register(MODAL_TAKE_OVER_ID, ControlKind::PresenceChrome);
        self.inner.controls.register(MODAL_CANCEL_ID, ControlKind::PresenceChrome);

        // Safe default before the first snapshot arrives.
        self.apply_gate(false);

        let _ = self.inner.manager.set(manager.clone());
        manager.initialize().await;

        let ui = self.clone();
        manager.on_presence_update(move |sessions| ui.update_presence_banner(sessions));
        let ui = self.clone();
        manager.on_lock_update(move |lock| ui.update_lock_status(lock));

        // Lock state is wired; replace the startup blocker with whatever
        // the gate currently says.
        let editing = *self.inner.editing_tx.borrow();
        let mut state = self.state();
        if state.overlay == Overlay::Startup {
            state.overlay = if editing { Overlay::Hidden } else { Overlay::EditBlocked };
        }
    }

    // =========================================================================
    // RECONCILIATION (driven by manager callbacks)
    // =========================================================================

    /// Rebuild the banner from a presence snapshot. Hidden when no other
    /// session is active; the access button docks into the banner while it
    /// is visible.
    pub fn update_presence_banner(&self, sessions: &[RemoteSession]) {
        let banner = PresenceBanner::from_sessions(sessions);
        let mut state = self.state();
        state.button = if banner.is_some() { ButtonPlacement::InBanner } else { ButtonPlacement::Floating };
        state.banner = banner;
    }

    /// Advance the lock state machine from a lock snapshot.
    pub fn update_lock_status(&self, lock: Option<&EditLock>) {
        let own_session = self.inner.manager.get().map(PresenceManager::session_id);
        let next = match lock {
            None => LockPhase::Unlocked,
            Some(l) if Some(l.locked_by) == own_session => LockPhase::LockedBySelf,
            Some(l) => LockPhase::LockedByOther { holder_name: l.holder_name.clone() },
        };

        let (changed, enable) = {
            let mut state = self.state();
            let changed = state.phase != next;
            state.phase = next.clone();
            match (&next, lock) {
                (LockPhase::LockedByOther { .. }, Some(l)) => {
                    state.modal = Some(LockModal::for_lock(l));
                    (changed, false)
                }
                _ => {
                    state.modal = None;
                    (changed, true)
                }
            }
        };

        if changed && next == LockPhase::LockedBySelf {
            self.notify(Severity::Success, "You have edit access.");
        }
        self.apply_gate(enable);
    }

    /// Flip the gate: sweep the control registry, publish on the watch
    /// channel, and reconcile the overlay (the startup blocker is left
    /// alone until `initialize` finishes).
    fn apply_gate(&self, enabled: bool) {
        self.inner.controls.set_editing_enabled(enabled);
        self.inner.editing_tx.send_if_modified(|current| {
            if *current == enabled {
                false
            } else {
                *current = enabled;
                true
            }
        });

        let mut state = self.state();
        if state.overlay != Overlay::Startup {
            state.overlay = if enabled { Overlay::Hidden } else { Overlay::EditBlocked };
        }
    }

    // =========================================================================
    // INTERACTION GATING
    // =========================================================================

    /// Interception point every interactive component routes through.
    /// Chrome is always allowed; a gated control while editing is disabled
    /// is blocked with exactly one warning toast.
    pub fn handle_interaction(&self, control_id: &str) -> Interaction {
        let Some(kind) = self.inner.controls.kind_of(control_id) else {
            // Unregistered element: nothing to gate.
            return Interaction::Allowed;
        };
        if !kind.is_gated() || self.inner.controls.editing_enabled() {
            return Interaction::Allowed;
        }

        let message = if kind == ControlKind::FormSubmit {
            "You need edit access before submitting changes."
        } else {
            "You need edit access to make changes."
        };
        self.notify(Severity::Warning, message);
        Interaction::Blocked
    }

    /// Register a page control under the gate. Convenience passthrough so
    /// page glue doesn't need to reach into the registry.
    pub fn register_control(&self, id: &str, kind: ControlKind) {
        self.inner.controls.register(id, kind);
    }

    /// Receiver components can subscribe to instead of being swept.
    #[must_use]
    pub fn subscribe_editing(&self) -> watch::Receiver<bool> {
        self.inner.editing_tx.subscribe()
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    /// Entry point for the edit-access button: request the lock, or show
    /// the takeover modal when someone else holds it.
    pub async fn request_edit_access(&self) {
        let Some(manager) = self.inner.manager.get().cloned() else {
            self.notify(Severity::Error, "Presence system is not ready yet.");
            return;
        };

        if manager.has_edit_lock() {
            self.notify(Severity::Info, "You already have edit access.");
            return;
        }

        let attempt = manager.request_edit_lock().await;
        if attempt.granted {
            self.notify(Severity::Success, &attempt.message);
        } else if let Some(holder) = &attempt.held_by {
            let modal = manager
                .current_lock()
                .map_or_else(|| LockModal::for_holder(holder), |l| LockModal::for_lock(&l));
            self.state().modal = Some(modal);
            self.notify(Severity::Warning, &attempt.message);
        } else {
            self.notify(Severity::Error, &attempt.message);
        }
    }

    /// "Take Over" click on the lock modal. A failed takeover leaves the
    /// modal open.
    pub async fn take_over(&self) {
        let Some(manager) = self.inner.manager.get().cloned() else {
            self.notify(Severity::Error, "Presence system is not ready yet.");
            return;
        };

        let attempt = manager.force_take_over_lock().await;
        if attempt.granted {
            self.state().modal = None;
            self.notify(Severity::Success, &attempt.message);
            self.apply_gate(true);
        } else {
            self.notify(Severity::Error, &attempt.message);
        }
    }

    /// "Cancel" click on the lock modal. Editing stays blocked; only the
    /// modal goes away.
    pub fn dismiss_modal(&self) {
        self.state().modal = None;
    }

    // =========================================================================
    // VIEW ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> LockPhase {
        self.state().phase.clone()
    }

    #[must_use]
    pub fn overlay(&self) -> Overlay {
        self.state().overlay
    }

    #[must_use]
    pub fn banner(&self) -> Option<PresenceBanner> {
        self.state().banner.clone()
    }

    #[must_use]
    pub fn modal(&self) -> Option<LockModal> {
        self.state().modal.clone()
    }

    #[must_use]
    pub fn button_placement(&self) -> ButtonPlacement {
        self.state().button
    }

    #[must_use]
    pub fn controls(&self) -> &ControlRegistry {
        &self.inner.controls
    }

    /// Live toasts right now.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.notifications.active(now_ms())
    }

    fn notify(&self, severity: Severity, message: &str) {
        self.inner.notifications.push(severity, message, now_ms());
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
