//! In-process `LiveStore` used by tests and the demo simulation.
//!
//! DESIGN
//! ======
//! Documents live behind one mutex; every mutation publishes a fresh
//! snapshot on the corresponding watch channel. This reproduces the
//! observable semantics of a hosted store: per-document last-writer-wins
//! plus asynchronous snapshot delivery to every subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use super::{LiveStore, StoreError};
use crate::record::{EditLock, PresenceRecord, now_ms};

/// Shared in-memory store. Cheap to clone; all clones see the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    docs: Mutex<Docs>,
    presence_tx: watch::Sender<Vec<PresenceRecord>>,
    lock_tx: watch::Sender<Option<EditLock>>,
}

struct Docs {
    presence: HashMap<Uuid, PresenceRecord>,
    lock: Option<EditLock>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (presence_tx, _) = watch::channel(Vec::new());
        let (lock_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(MemoryInner {
                docs: Mutex::new(Docs { presence: HashMap::new(), lock: None }),
                presence_tx,
                lock_tx,
            }),
        }
    }

    fn docs(&self) -> std::sync::MutexGuard<'_, Docs> {
        self.inner
            .docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_presence(&self, docs: &Docs) {
        let mut snapshot: Vec<PresenceRecord> = docs.presence.values().cloned().collect();
        // Deterministic order for subscribers and tests.
        snapshot.sort_by_key(|r| r.session_id);
        let _ = self.inner.presence_tx.send(snapshot);
    }

    fn publish_lock(&self, docs: &Docs) {
        let _ = self.inner.lock_tx.send(docs.lock.clone());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveStore for MemoryStore {
    fn now_ms(&self) -> i64 {
        now_ms()
    }

    async fn put_presence(&self, mut record: PresenceRecord) -> Result<(), StoreError> {
        let docs = &mut *self.docs();
        record.last_active = now_ms();
        docs.presence.insert(record.session_id, record);
        self.publish_presence(docs);
        Ok(())
    }

    async fn delete_presence(&self, session_id: Uuid) -> Result<(), StoreError> {
        let docs = &mut *self.docs();
        docs.presence.remove(&session_id);
        self.publish_presence(docs);
        Ok(())
    }

    async fn get_lock(&self) -> Result<Option<EditLock>, StoreError> {
        Ok(self.docs().lock.clone())
    }

    async fn put_lock(&self, mut lock: EditLock) -> Result<(), StoreError> {
        let docs = &mut *self.docs();
        lock.locked_at = now_ms();
        docs.lock = Some(lock);
        self.publish_lock(docs);
        Ok(())
    }

    async fn delete_lock(&self) -> Result<(), StoreError> {
        let docs = &mut *self.docs();
        docs.lock = None;
        self.publish_lock(docs);
        Ok(())
    }

    fn watch_presence(&self) -> watch::Receiver<Vec<PresenceRecord>> {
        self.inner.presence_tx.subscribe()
    }

    fn watch_lock(&self) -> watch::Receiver<Option<EditLock>> {
        self.inner.lock_tx.subscribe()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
impl MemoryStore {
    /// Current presence records, sorted by session id.
    pub(crate) fn presence_snapshot(&self) -> Vec<PresenceRecord> {
        let docs = self.docs();
        let mut records: Vec<PresenceRecord> = docs.presence.values().cloned().collect();
        records.sort_by_key(|r| r.session_id);
        records
    }

    /// Current lock document, if any.
    pub(crate) fn lock_snapshot(&self) -> Option<EditLock> {
        self.docs().lock.clone()
    }

    /// Rewrite the lock's acquisition timestamp into the past, simulating
    /// a holder that stopped renewing.
    pub(crate) fn backdate_lock(&self, by_ms: i64) {
        let docs = &mut *self.docs();
        if let Some(lock) = docs.lock.as_mut() {
            lock.locked_at -= by_ms;
        }
        self.publish_lock(docs);
    }

    /// Rewrite one session's `last_active` into the past.
    pub(crate) fn backdate_presence(&self, session_id: Uuid, by_ms: i64) {
        let docs = &mut *self.docs();
        if let Some(record) = docs.presence.get_mut(&session_id) {
            record.last_active -= by_ms;
        }
        self.publish_presence(docs);
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
