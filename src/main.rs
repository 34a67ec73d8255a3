//! Two-session contention demo over the in-memory store.
//!
//! Runs the full stack — profile, manager, UI — for two simulated sessions
//! sharing one store, and walks through acquire, rejection, forced
//! takeover, and shutdown, logging every transition.

use std::sync::Arc;
use std::time::Duration;

use lockboard::config::PresenceConfig;
use lockboard::manager::PresenceManager;
use lockboard::profile::MemoryProfile;
use lockboard::store::memory::MemoryStore;
use lockboard::ui::PresenceUi;

struct Session {
    name: &'static str,
    manager: PresenceManager,
    ui: PresenceUi,
}

impl Session {
    async fn open(store: &MemoryStore, name: &'static str, page: &str) -> Self {
        let profile = MemoryProfile::with_display_name(name);
        let store: Arc<dyn lockboard::LiveStore> = Arc::new(store.clone());
        let manager = PresenceManager::new(store, &profile, page, PresenceConfig::from_env());
        let ui = PresenceUi::new(PresenceConfig::from_env());
        ui.initialize(manager.clone()).await;
        Self { name, manager, ui }
    }

    fn report(&self) {
        tracing::info!(
            session = self.name,
            phase = ?self.ui.phase(),
            has_lock = self.manager.has_edit_lock(),
            modal = self.ui.modal().is_some(),
            "session state"
        );
        for toast in self.ui.notifications() {
            tracing::info!(session = self.name, severity = ?toast.severity, toast = %toast.message, "toast");
        }
    }
}

/// Let watch snapshots propagate between steps.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = MemoryStore::new();
    let alice = Session::open(&store, "Alice", "leads").await;
    let bob = Session::open(&store, "Bob", "projects").await;
    settle().await;

    tracing::info!("--- Alice requests edit access ---");
    alice.ui.request_edit_access().await;
    settle().await;
    alice.report();
    bob.report();

    tracing::info!("--- Bob requests edit access (rejected, modal shown) ---");
    bob.ui.request_edit_access().await;
    settle().await;
    bob.report();

    tracing::info!("--- Bob takes over ---");
    bob.ui.take_over().await;
    settle().await;
    alice.report();
    bob.report();

    tracing::info!("--- Bob shuts down, lock released ---");
    bob.manager.shutdown().await;
    settle().await;
    alice.report();

    alice.manager.shutdown().await;
}
