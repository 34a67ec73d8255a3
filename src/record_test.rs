use super::*;

const WINDOW_MS: i64 = 120_000;

fn record_at(last_active: i64) -> PresenceRecord {
    PresenceRecord {
        session_id: Uuid::new_v4(),
        name: "Alice".into(),
        page: "leads".into(),
        last_active,
    }
}

fn lock_at(locked_at: i64) -> EditLock {
    EditLock {
        locked_by: Uuid::new_v4(),
        holder_name: "Alice".into(),
        locked_at,
        page: "leads".into(),
    }
}

// =============================================================================
// now_ms
// =============================================================================

#[test]
fn now_ms_is_positive() {
    assert!(now_ms() > 0);
}

#[test]
fn now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}

// =============================================================================
// PresenceRecord freshness
// =============================================================================

#[test]
fn record_active_when_fresh() {
    let record = record_at(1_000_000);
    assert!(record.is_active(1_030_000, WINDOW_MS));
}

#[test]
fn record_active_exactly_at_window() {
    let record = record_at(1_000_000);
    assert!(record.is_active(1_120_000, WINDOW_MS));
}

#[test]
fn record_inactive_one_ms_past_window() {
    let record = record_at(1_000_000);
    assert!(!record.is_active(1_120_001, WINDOW_MS));
}

#[test]
fn record_121_seconds_old_is_inactive() {
    let record = record_at(0);
    assert!(!record.is_active(121_000, WINDOW_MS));
}

#[test]
fn record_with_future_timestamp_is_active() {
    // Clock skew between store and client must not mark live sessions dead.
    let record = record_at(2_000_000);
    assert!(record.is_active(1_000_000, WINDOW_MS));
}

// =============================================================================
// EditLock staleness and ownership
// =============================================================================

#[test]
fn lock_fresh_within_window() {
    let lock = lock_at(1_000_000);
    assert!(!lock.is_stale(1_060_000, WINDOW_MS));
}

#[test]
fn lock_not_stale_exactly_at_window() {
    let lock = lock_at(1_000_000);
    assert!(!lock.is_stale(1_120_000, WINDOW_MS));
}

#[test]
fn lock_stale_past_window() {
    let lock = lock_at(1_000_000);
    assert!(lock.is_stale(1_120_001, WINDOW_MS));
}

#[test]
fn lock_150_seconds_old_is_stale() {
    let lock = lock_at(0);
    assert!(lock.is_stale(150_000, WINDOW_MS));
}

#[test]
fn lock_held_by_matches_session_only() {
    let lock = lock_at(0);
    assert!(lock.is_held_by(lock.locked_by));
    assert!(!lock.is_held_by(Uuid::new_v4()));
}

// =============================================================================
// LockAttempt
// =============================================================================

#[test]
fn granted_attempt_carries_no_holder() {
    let attempt = LockAttempt::granted("ok");
    assert!(attempt.granted);
    assert_eq!(attempt.message, "ok");
    assert!(attempt.held_by.is_none());
}

#[test]
fn rejected_attempt_names_holder() {
    let attempt = LockAttempt::rejected("busy", Some("Alice".into()));
    assert!(!attempt.granted);
    assert_eq!(attempt.held_by.as_deref(), Some("Alice"));
}

// =============================================================================
// Serde
// =============================================================================

#[test]
fn presence_record_serde_round_trip() {
    let record = record_at(42);
    let json = serde_json::to_string(&record).unwrap();
    let restored: PresenceRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.session_id, record.session_id);
    assert_eq!(restored.name, "Alice");
    assert_eq!(restored.page, "leads");
    assert_eq!(restored.last_active, 42);
}

#[test]
fn edit_lock_serde_round_trip() {
    let lock = lock_at(42);
    let json = serde_json::to_string(&lock).unwrap();
    let restored: EditLock = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.locked_by, lock.locked_by);
    assert_eq!(restored.holder_name, "Alice");
    assert_eq!(restored.locked_at, 42);
}
