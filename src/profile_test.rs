use super::*;
use uuid::Uuid;

// =============================================================================
// MemoryProfile
// =============================================================================

#[test]
fn memory_profile_get_missing_is_none() {
    let profile = MemoryProfile::new();
    assert!(profile.get(SESSION_ID_KEY).is_none());
}

#[test]
fn memory_profile_set_then_get() {
    let profile = MemoryProfile::new();
    profile.set(SESSION_ID_KEY, "abc");
    assert_eq!(profile.get(SESSION_ID_KEY).as_deref(), Some("abc"));
}

#[test]
fn memory_profile_set_overwrites() {
    let profile = MemoryProfile::new();
    profile.set("k", "v1");
    profile.set("k", "v2");
    assert_eq!(profile.get("k").as_deref(), Some("v2"));
}

#[test]
fn with_display_name_seeds_key() {
    let profile = MemoryProfile::with_display_name("Alice");
    assert_eq!(profile.get(DISPLAY_NAME_KEY).as_deref(), Some("Alice"));
}

// =============================================================================
// FileProfile
// =============================================================================

fn temp_profile_path() -> PathBuf {
    std::env::temp_dir().join(format!("lockboard-profile-{}.json", Uuid::new_v4()))
}

#[test]
fn file_profile_survives_reopen() {
    let path = temp_profile_path();

    let profile = FileProfile::open(&path);
    profile.set(DISPLAY_NAME_KEY, "Alice");
    profile.set(SESSION_ID_KEY, "some-id");
    drop(profile);

    let reopened = FileProfile::open(&path);
    assert_eq!(reopened.get(DISPLAY_NAME_KEY).as_deref(), Some("Alice"));
    assert_eq!(reopened.get(SESSION_ID_KEY).as_deref(), Some("some-id"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_profile_missing_file_starts_empty() {
    let path = temp_profile_path();
    let profile = FileProfile::open(&path);
    assert!(profile.get(DISPLAY_NAME_KEY).is_none());
}

#[test]
fn file_profile_corrupt_file_starts_empty() {
    let path = temp_profile_path();
    std::fs::write(&path, "not json {{{").unwrap();

    let profile = FileProfile::open(&path);
    assert!(profile.get(DISPLAY_NAME_KEY).is_none());

    // Writing through repairs the file.
    profile.set(DISPLAY_NAME_KEY, "Alice");
    let reopened = FileProfile::open(&path);
    assert_eq!(reopened.get(DISPLAY_NAME_KEY).as_deref(), Some("Alice"));

    let _ = std::fs::remove_file(&path);
}
