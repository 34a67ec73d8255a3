//! Live store seam — the real-time document store the protocol runs on.
//!
//! DESIGN
//! ======
//! The protocol needs only a handful of operations against two well-known
//! locations: upsert/delete on the presence collection, get/upsert/delete
//! on the single lock document, a store-assigned timestamp, and push-style
//! snapshot subscriptions. `tokio::sync::watch` carries the snapshots:
//! subscribers always observe the latest state and may skip intermediate
//! ones, which matches the last-write-wins consistency the protocol
//! already assumes.
//!
//! Writes to the same document are serialized by the store (last writer
//! wins). No ordering is assumed across documents.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::record::{EditLock, PresenceRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Abstract real-time document store.
#[async_trait]
pub trait LiveStore: Send + Sync {
    /// Store-assigned timestamp, ms since epoch.
    fn now_ms(&self) -> i64;

    /// Upsert a session's presence record. The store stamps `last_active`
    /// at write time; the caller's value is ignored.
    async fn put_presence(&self, record: PresenceRecord) -> Result<(), StoreError>;

    /// Delete a session's presence record. Deleting a missing record is
    /// not an error.
    async fn delete_presence(&self, session_id: Uuid) -> Result<(), StoreError>;

    /// Read the lock document once. `None` means unlocked.
    async fn get_lock(&self) -> Result<Option<EditLock>, StoreError>;

    /// Unconditionally upsert the lock document (not a compare-and-swap).
    /// The store stamps `locked_at` at write time.
    async fn put_lock(&self, lock: EditLock) -> Result<(), StoreError>;

    /// Delete the lock document. Deleting a missing lock is not an error.
    async fn delete_lock(&self) -> Result<(), StoreError>;

    /// Subscribe to presence-collection snapshots.
    fn watch_presence(&self) -> watch::Receiver<Vec<PresenceRecord>>;

    /// Subscribe to lock-document snapshots.
    fn watch_lock(&self) -> watch::Receiver<Option<EditLock>>;
}
