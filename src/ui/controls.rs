//! Control registry — the UI-side gating surface.
//!
//! DESIGN
//! ======
//! Interactive components register themselves with a kind instead of being
//! discovered by a page-wide selector sweep; gating flips every gated
//! control's enabled flag in one pass. Presence chrome (the access button,
//! banner, modal) is never gated so the lock-request path stays usable
//! while everything else is blocked. Toggling an unknown id is skipped
//! silently and never aborts the sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Families of editable controls the dashboard pages register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    EditButton,
    AddButton,
    SaveButton,
    DeleteButton,
    CompleteButton,
    ActionButton,
    TextInput,
    Select,
    TextArea,
    ContentEditable,
    FormSubmit,
    /// Presence-system chrome. Exempt from gating.
    PresenceChrome,
}

impl ControlKind {
    /// Whether this control family is subject to edit-lock gating.
    #[must_use]
    pub fn is_gated(self) -> bool {
        !matches!(self, ControlKind::PresenceChrome)
    }
}

#[derive(Debug, Clone)]
struct Control {
    kind: ControlKind,
    enabled: bool,
}

/// Registry of interactive controls, swept on every lock-state change.
#[derive(Default)]
pub struct ControlRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    controls: HashMap<String, Control>,
    // Safe default: everything gated starts disabled until the first lock
    // snapshot says otherwise.
    editing_enabled: bool,
}

impl ControlRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a control. Its initial enabled state follows the current
    /// gate; chrome is always enabled.
    pub fn register(&self, id: &str, kind: ControlKind) {
        let mut inner = self.lock();
        let enabled = inner.editing_enabled || !kind.is_gated();
        inner.controls.insert(id.to_owned(), Control { kind, enabled });
    }

    /// Remove a control, e.g. when its component unmounts. Unknown ids are
    /// ignored.
    pub fn deregister(&self, id: &str) {
        self.lock().controls.remove(id);
    }

    /// Sweep every registered control to match the gate.
    pub fn set_editing_enabled(&self, enabled: bool) {
        let mut inner = self.lock();
        inner.editing_enabled = enabled;
        for control in inner.controls.values_mut() {
            if control.kind.is_gated() {
                control.enabled = enabled;
            }
        }
    }

    #[must_use]
    pub fn editing_enabled(&self) -> bool {
        self.lock().editing_enabled
    }

    /// Enabled state of one control; `None` when it was never registered.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.lock().controls.get(id).map(|c| c.enabled)
    }

    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<ControlKind> {
        self.lock().controls.get(id).map(|c| c.kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().controls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().controls.is_empty()
    }
}

#[cfg(test)]
#[path = "controls_test.rs"]
mod tests;
