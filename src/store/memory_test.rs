use super::*;

fn record(name: &str, page: &str) -> PresenceRecord {
    PresenceRecord {
        session_id: Uuid::new_v4(),
        name: name.into(),
        page: page.into(),
        last_active: 0,
    }
}

fn lock(name: &str) -> EditLock {
    EditLock {
        locked_by: Uuid::new_v4(),
        holder_name: name.into(),
        locked_at: 0,
        page: "leads".into(),
    }
}

// =============================================================================
// Presence collection
// =============================================================================

#[tokio::test]
async fn put_presence_stamps_last_active() {
    let store = MemoryStore::new();
    let before = now_ms();
    store.put_presence(record("Alice", "leads")).await.unwrap();

    let snapshot = store.presence_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].last_active >= before);
}

#[tokio::test]
async fn put_presence_overwrites_same_session() {
    let store = MemoryStore::new();
    let mut r = record("Alice", "leads");
    store.put_presence(r.clone()).await.unwrap();
    r.page = "projects".into();
    store.put_presence(r).await.unwrap();

    let snapshot = store.presence_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].page, "projects");
}

#[tokio::test]
async fn delete_presence_removes_record() {
    let store = MemoryStore::new();
    let r = record("Alice", "leads");
    let id = r.session_id;
    store.put_presence(r).await.unwrap();
    store.delete_presence(id).await.unwrap();
    assert!(store.presence_snapshot().is_empty());
}

#[tokio::test]
async fn delete_missing_presence_is_ok() {
    let store = MemoryStore::new();
    store.delete_presence(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn watch_presence_delivers_snapshots() {
    let store = MemoryStore::new();
    let mut rx = store.watch_presence();
    assert!(rx.borrow().is_empty());

    store.put_presence(record("Alice", "leads")).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    store.put_presence(record("Bob", "projects")).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 2);
}

// =============================================================================
// Lock document
// =============================================================================

#[tokio::test]
async fn put_lock_stamps_locked_at() {
    let store = MemoryStore::new();
    let before = now_ms();
    store.put_lock(lock("Alice")).await.unwrap();
    let current = store.lock_snapshot().unwrap();
    assert!(current.locked_at >= before);
}

#[tokio::test]
async fn put_lock_is_last_writer_wins() {
    let store = MemoryStore::new();
    store.put_lock(lock("Alice")).await.unwrap();
    let bob = lock("Bob");
    let bob_id = bob.locked_by;
    store.put_lock(bob).await.unwrap();

    let current = store.lock_snapshot().unwrap();
    assert_eq!(current.locked_by, bob_id);
    assert_eq!(current.holder_name, "Bob");
}

#[tokio::test]
async fn delete_lock_unlocks() {
    let store = MemoryStore::new();
    store.put_lock(lock("Alice")).await.unwrap();
    store.delete_lock().await.unwrap();
    assert!(store.lock_snapshot().is_none());
    assert!(store.get_lock().await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_lock_is_ok() {
    let store = MemoryStore::new();
    store.delete_lock().await.unwrap();
}

#[tokio::test]
async fn watch_lock_delivers_changes() {
    let store = MemoryStore::new();
    let mut rx = store.watch_lock();
    assert!(rx.borrow().is_none());

    store.put_lock(lock("Alice")).await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().as_ref().unwrap().holder_name, "Alice");

    store.delete_lock().await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_none());
}

// =============================================================================
// Test helpers
// =============================================================================

#[tokio::test]
async fn backdate_lock_rewinds_timestamp() {
    let store = MemoryStore::new();
    store.put_lock(lock("Alice")).await.unwrap();
    let fresh = store.lock_snapshot().unwrap().locked_at;
    store.backdate_lock(150_000);
    let aged = store.lock_snapshot().unwrap().locked_at;
    assert_eq!(fresh - aged, 150_000);
}

#[tokio::test]
async fn backdate_presence_rewinds_timestamp() {
    let store = MemoryStore::new();
    let r = record("Alice", "leads");
    let id = r.session_id;
    store.put_presence(r).await.unwrap();
    let fresh = store.presence_snapshot()[0].last_active;
    store.backdate_presence(id, 121_000);
    let aged = store.presence_snapshot()[0].last_active;
    assert_eq!(fresh - aged, 121_000);
}
