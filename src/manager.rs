//! Presence manager — the raw coordination protocol.
//!
//! DESIGN
//! ======
//! One instance per session, created at page-script init and torn down by
//! `shutdown`. Owns three background tasks: the heartbeat writer and one
//! watcher per subscription (presence collection, lock document). Lock
//! acquisition is an unconditional last-writer-wins upsert; two sessions
//! racing an unlocked slot can both observe success locally, and the loser
//! is corrected by the next lock snapshot.
//!
//! ERROR HANDLING
//! ==============
//! Every public operation resolves store failures at this boundary: lock
//! requests degrade to a rejected `LockAttempt`, release and shutdown log
//! and move on. Nothing propagates to callers as an error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PresenceConfig;
use crate::profile::{DISPLAY_NAME_KEY, ProfileStore, SESSION_ID_KEY};
use crate::record::{EditLock, LockAttempt, PresenceRecord, RemoteSession};
use crate::store::LiveStore;

/// Fallback display name when the profile has none set at login.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Foreground/background state of the session, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

type PresenceCallback = Arc<dyn Fn(&[RemoteSession]) + Send + Sync>;
type LockCallback = Arc<dyn Fn(Option<&EditLock>) + Send + Sync>;

// =============================================================================
// MANAGER
// =============================================================================

/// Per-session coordination handle. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct PresenceManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    store: Arc<dyn LiveStore>,
    config: PresenceConfig,
    session_id: Uuid,
    display_name: String,
    page: String,
    state: Mutex<ManagerState>,
    visibility_tx: watch::Sender<Visibility>,
    presence_cb: Mutex<Option<PresenceCallback>>,
    lock_cb: Mutex<Option<LockCallback>>,
}

#[derive(Default)]
struct ManagerState {
    initialized: bool,
    others: Vec<RemoteSession>,
    lock: Option<EditLock>,
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in &state.tasks {
            task.abort();
        }
    }
}

impl PresenceManager {
    /// Build a manager for one session. Identity is resolved from the
    /// profile here and never fails: the session id is generated and
    /// persisted on first use, and a missing display name falls back to
    /// [`UNKNOWN_USER`].
    #[must_use]
    pub fn new(
        store: Arc<dyn LiveStore>,
        profile: &dyn ProfileStore,
        page: impl Into<String>,
        config: PresenceConfig,
    ) -> Self {
        let session_id = resolve_session_id(profile);
        let display_name = profile
            .get(DISPLAY_NAME_KEY)
            .unwrap_or_else(|| UNKNOWN_USER.to_owned());
        let (visibility_tx, _) = watch::channel(Visibility::Visible);

        Self {
            inner: Arc::new(ManagerInner {
                store,
                config,
                session_id,
                display_name,
                page: page.into(),
                state: Mutex::new(ManagerState::default()),
                visibility_tx,
                presence_cb: Mutex::new(None),
                lock_cb: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    #[must_use]
    pub fn page(&self) -> &str {
        &self.inner.page
    }

    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Write the first heartbeat, prime the in-memory lock mirror, and
    /// start the heartbeat and watcher tasks. Idempotent: a second call is
    /// a no-op.
    pub async fn initialize(&self) {
        {
            let mut state = self.state();
            if state.initialized {
                return;
            }
            state.initialized = true;
        }

        // Immediate first heartbeat so peers see this session right away.
        self.write_presence().await;

        // Prime the lock mirror before anyone can ask `has_edit_lock`, so
        // callback registration hands out real state, not the default.
        match self.inner.store.get_lock().await {
            Ok(lock) => self.state().lock = lock,
            Err(e) => warn!(error = %e, "initial lock read failed"),
        }

        let tasks = vec![
            tokio::spawn(heartbeat_loop(self.clone())),
            tokio::spawn(presence_watch_loop(self.clone())),
            tokio::spawn(lock_watch_loop(self.clone())),
        ];
        self.state().tasks = tasks;

        info!(
            session_id = %self.inner.session_id,
            name = %self.inner.display_name,
            page = %self.inner.page,
            "presence manager initialized"
        );
    }

    /// Report foreground/background state. Hidden sessions heartbeat at
    /// the reduced cadence; foregrounding writes immediately and resumes
    /// the fast cadence.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.inner.visibility_tx.send_if_modified(|current| {
            if *current == visibility {
                false
            } else {
                *current = visibility;
                true
            }
        });
    }

    /// Best-effort teardown for page unload: release the lock if held,
    /// delete this session's presence record, stop background tasks.
    /// Staleness, not this cleanup, keeps the system correct when a
    /// session dies without running it.
    pub async fn shutdown(&self) {
        let (tasks, held) = {
            let mut state = self.state();
            let held = state
                .lock
                .as_ref()
                .is_some_and(|l| l.is_held_by(self.inner.session_id));
            (std::mem::take(&mut state.tasks), held)
        };
        for task in tasks {
            task.abort();
        }

        if held {
            if let Err(e) = self.inner.store.delete_lock().await {
                warn!(error = %e, "lock release on shutdown failed");
            }
        }
        if let Err(e) = self.inner.store.delete_presence(self.inner.session_id).await {
            warn!(error = %e, "presence delete on shutdown failed");
        }
        info!(session_id = %self.inner.session_id, "presence manager shut down");
    }

    // =========================================================================
    // LOCK PROTOCOL
    // =========================================================================

    /// Try to acquire the edit lock. Holding it already is an idempotent
    /// success; a stale foreign lock is taken over; a fresh foreign lock
    /// is a rejection naming the holder. Store failures degrade to a
    /// rejected attempt.
    pub async fn request_edit_lock(&self) -> LockAttempt {
        let current = match self.inner.store.get_lock().await {
            Ok(lock) => lock,
            Err(e) => {
                warn!(error = %e, "edit lock check failed");
                return LockAttempt::rejected("Could not check edit access. Please try again.", None);
            }
        };

        let now = self.inner.store.now_ms();
        let window = self.inner.config.staleness_window_ms();

        match current {
            None => self.acquire("You now have edit access.").await,
            Some(lock) if lock.is_held_by(self.inner.session_id) => {
                debug!("edit lock already held; reacquire is a no-op");
                LockAttempt::granted("You already have edit access.")
            }
            Some(lock) if lock.is_stale(now, window) => {
                info!(previous = %lock.holder_name, "taking over stale edit lock");
                let message =
                    format!("Previous lock by {} went stale; you now have edit access.", lock.holder_name);
                self.acquire(message).await
            }
            Some(lock) => {
                let message = format!("Currently being edited by {}.", lock.holder_name);
                LockAttempt::rejected(message, Some(lock.holder_name))
            }
        }
    }

    /// Unconditionally reassign the lock to this session, regardless of
    /// the current holder or freshness.
    pub async fn force_take_over_lock(&self) -> LockAttempt {
        info!(session_id = %self.inner.session_id, "forcing edit lock takeover");
        self.acquire("You took over edit access.").await
    }

    /// Delete the lock document. Failure is logged, not propagated.
    pub async fn release_edit_lock(&self) {
        match self.inner.store.delete_lock().await {
            Ok(()) => {
                self.state().lock = None;
                info!(session_id = %self.inner.session_id, "edit lock released");
            }
            Err(e) => warn!(error = %e, "edit lock release failed"),
        }
    }

    /// Whether the last known lock belongs to this session.
    #[must_use]
    pub fn has_edit_lock(&self) -> bool {
        self.state()
            .lock
            .as_ref()
            .is_some_and(|l| l.is_held_by(self.inner.session_id))
    }

    /// Last known lock document, if any.
    #[must_use]
    pub fn current_lock(&self) -> Option<EditLock> {
        self.state().lock.clone()
    }

    /// Last known remote sessions (active or not; the UI decides what to
    /// show).
    #[must_use]
    pub fn other_users(&self) -> Vec<RemoteSession> {
        self.state().others.clone()
    }

    async fn acquire(&self, message: impl Into<String>) -> LockAttempt {
        let lock = EditLock {
            locked_by: self.inner.session_id,
            holder_name: self.inner.display_name.clone(),
            locked_at: self.inner.store.now_ms(),
            page: self.inner.page.clone(),
        };

        match self.inner.store.put_lock(lock.clone()).await {
            Ok(()) => {
                // Mirror optimistically so `has_edit_lock` answers before
                // the snapshot lands; the next snapshot is authoritative.
                self.state().lock = Some(lock);
                LockAttempt::granted(message)
            }
            Err(e) => {
                warn!(error = %e, "edit lock write failed");
                LockAttempt::rejected("Could not acquire edit access. Please try again.", None)
            }
        }
    }

    // =========================================================================
    // CALLBACKS
    // =========================================================================

    /// Register the presence callback slot. The current snapshot is
    /// delivered immediately so late registrants don't wait for the next
    /// change.
    pub fn on_presence_update(&self, cb: impl Fn(&[RemoteSession]) + Send + Sync + 'static) {
        let cb: PresenceCallback = Arc::new(cb);
        *self
            .inner
            .presence_cb
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(cb.clone());
        let others = self.other_users();
        cb(&others);
    }

    /// Register the lock callback slot. The current lock state is
    /// delivered immediately.
    pub fn on_lock_update(&self, cb: impl Fn(Option<&EditLock>) + Send + Sync + 'static) {
        let cb: LockCallback = Arc::new(cb);
        *self
            .inner
            .lock_cb
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(cb.clone());
        let lock = self.current_lock();
        cb(lock.as_ref());
    }

    // =========================================================================
    // SNAPSHOT HANDLING
    // =========================================================================

    async fn write_presence(&self) {
        let record = PresenceRecord {
            session_id: self.inner.session_id,
            name: self.inner.display_name.clone(),
            page: self.inner.page.clone(),
            // Stamped by the store at write time.
            last_active: 0,
        };
        if let Err(e) = self.inner.store.put_presence(record).await {
            warn!(error = %e, "presence heartbeat failed");
        }
    }

    fn apply_presence_snapshot(&self, records: &[PresenceRecord]) {
        let now = self.inner.store.now_ms();
        let window = self.inner.config.staleness_window_ms();
        let others: Vec<RemoteSession> = records
            .iter()
            .filter(|r| r.session_id != self.inner.session_id)
            .map(|r| RemoteSession { record: r.clone(), is_active: r.is_active(now, window) })
            .collect();

        self.state().others = others.clone();

        let cb = self
            .inner
            .presence_cb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(cb) = cb {
            cb(&others);
        }
    }

    fn apply_lock_snapshot(&self, lock: Option<EditLock>) {
        debug!(
            holder = lock.as_ref().map_or("-", |l| l.holder_name.as_str()),
            "lock snapshot"
        );
        self.state().lock = lock.clone();

        let cb = self
            .inner
            .lock_cb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(cb) = cb {
            cb(lock.as_ref());
        }
    }
}

// =============================================================================
// BACKGROUND TASKS
// =============================================================================

/// Periodic presence writes. Cadence follows visibility: reduced while the
/// session is hidden, immediate write + fast cadence on foregrounding.
async fn heartbeat_loop(manager: PresenceManager) {
    let mut visibility_rx = manager.inner.visibility_tx.subscribe();

    loop {
        let interval = match *visibility_rx.borrow_and_update() {
            Visibility::Visible => manager.inner.config.heartbeat,
            Visibility::Hidden => manager.inner.config.hidden_heartbeat,
        };

        tokio::select! {
            () = tokio::time::sleep(interval) => {
                manager.write_presence().await;
            }
            changed = visibility_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if *visibility_rx.borrow_and_update() == Visibility::Visible {
                    manager.write_presence().await;
                }
            }
        }
    }
}

async fn presence_watch_loop(manager: PresenceManager) {
    let mut rx = manager.inner.store.watch_presence();
    // Process the initial snapshot, then every change.
    rx.mark_changed();
    while rx.changed().await.is_ok() {
        let records = rx.borrow_and_update().clone();
        manager.apply_presence_snapshot(&records);
    }
}

async fn lock_watch_loop(manager: PresenceManager) {
    let mut rx = manager.inner.store.watch_lock();
    rx.mark_changed();
    while rx.changed().await.is_ok() {
        let lock = rx.borrow_and_update().clone();
        manager.apply_lock_snapshot(lock);
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Read the durable session id from the profile, generating and persisting
/// one on first use. Reloads in the same profile reuse the id; other
/// devices get their own.
fn resolve_session_id(profile: &dyn ProfileStore) -> Uuid {
    if let Some(id) = profile.get(SESSION_ID_KEY).and_then(|v| v.parse().ok()) {
        return id;
    }
    let id = Uuid::new_v4();
    profile.set(SESSION_ID_KEY, &id.to_string());
    id
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
