use super::*;

#[test]
fn gated_controls_start_disabled() {
    let registry = ControlRegistry::new();
    registry.register("save", ControlKind::SaveButton);
    registry.register("title", ControlKind::TextInput);

    assert_eq!(registry.is_enabled("save"), Some(false));
    assert_eq!(registry.is_enabled("title"), Some(false));
    assert!(!registry.editing_enabled());
}

#[test]
fn chrome_is_always_enabled() {
    let registry = ControlRegistry::new();
    registry.register("access", ControlKind::PresenceChrome);
    assert_eq!(registry.is_enabled("access"), Some(true));

    registry.set_editing_enabled(false);
    assert_eq!(registry.is_enabled("access"), Some(true));
}

#[test]
fn sweep_flips_every_gated_control() {
    let registry = ControlRegistry::new();
    registry.register("save", ControlKind::SaveButton);
    registry.register("delete", ControlKind::DeleteButton);
    registry.register("access", ControlKind::PresenceChrome);

    registry.set_editing_enabled(true);
    assert_eq!(registry.is_enabled("save"), Some(true));
    assert_eq!(registry.is_enabled("delete"), Some(true));
    assert_eq!(registry.is_enabled("access"), Some(true));

    registry.set_editing_enabled(false);
    assert_eq!(registry.is_enabled("save"), Some(false));
    assert_eq!(registry.is_enabled("delete"), Some(false));
    assert_eq!(registry.is_enabled("access"), Some(true));
}

#[test]
fn late_registration_follows_current_gate() {
    let registry = ControlRegistry::new();
    registry.set_editing_enabled(true);
    registry.register("save", ControlKind::SaveButton);
    assert_eq!(registry.is_enabled("save"), Some(true));
}

#[test]
fn reregistering_resets_to_gate() {
    let registry = ControlRegistry::new();
    registry.register("save", ControlKind::SaveButton);
    registry.set_editing_enabled(true);
    registry.register("save", ControlKind::SaveButton);
    assert_eq!(registry.is_enabled("save"), Some(true));
    assert_eq!(registry.len(), 1);
}

#[test]
fn deregister_removes_control() {
    let registry = ControlRegistry::new();
    registry.register("save", ControlKind::SaveButton);
    registry.deregister("save");
    assert!(registry.is_enabled("save").is_none());
    assert!(registry.is_empty());
}

#[test]
fn deregister_unknown_is_silent() {
    let registry = ControlRegistry::new();
    registry.deregister("nope");
}

#[test]
fn unknown_control_has_no_state() {
    let registry = ControlRegistry::new();
    assert!(registry.is_enabled("nope").is_none());
    assert!(registry.kind_of("nope").is_none());
}

#[test]
fn kind_of_reports_registration() {
    let registry = ControlRegistry::new();
    registry.register("form", ControlKind::FormSubmit);
    assert_eq!(registry.kind_of("form"), Some(ControlKind::FormSubmit));
}

#[test]
fn only_chrome_is_exempt_from_gating() {
    assert!(!ControlKind::PresenceChrome.is_gated());
    for kind in [
        ControlKind::EditButton,
        ControlKind::AddButton,
        ControlKind::SaveButton,
        ControlKind::DeleteButton,
        ControlKind::CompleteButton,
        ControlKind::ActionButton,
        ControlKind::TextInput,
        ControlKind::Select,
        ControlKind::TextArea,
        ControlKind::ContentEditable,
        ControlKind::FormSubmit,
    ] {
        assert!(kind.is_gated());
    }
}
