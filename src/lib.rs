//! lockboard — presence tracking and advisory edit locking for a shared
//! dashboard.
//!
//! ARCHITECTURE
//! ============
//! Two layers over an abstract real-time store:
//! - [`PresenceManager`] owns the coordination protocol: heartbeats, the
//!   other-session map, and the lock acquire/release/steal state machine.
//!   It has no UI knowledge.
//! - [`PresenceUi`] owns reconciliation: it reacts to manager callbacks,
//!   gates every registered control, and maintains banner/modal/toast view
//!   models. It holds no coordination logic.
//!
//! DESIGN
//! ======
//! Mutual exclusion is advisory. Acquisition is an unconditional
//! last-writer-wins upsert, not a compare-and-swap; races between sessions
//! are corrected by the next snapshot delivery. Liveness is judged from
//! store-assigned timestamps, never from record existence — a session that
//! dies without cleanup is reclassified by the staleness window.

pub mod config;
pub mod manager;
pub mod profile;
pub mod record;
pub mod store;
pub mod ui;

pub use config::PresenceConfig;
pub use manager::{PresenceManager, Visibility};
pub use record::{EditLock, LockAttempt, PresenceRecord, RemoteSession};
pub use store::{LiveStore, StoreError};
pub use ui::PresenceUi;
