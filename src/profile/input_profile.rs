use crate::input::{Chord, ComboId, LogicalButton, PhysicalButton};
use std::collections::BTreeMap;
use tracing::{debug, error};

use super::AppId;

/// Mapping and combo tables for one scope (the default profile or one app).
///
/// Only overrides are stored: a logical button without an entry maps to the
/// physical button at the same index. Setters mark the profile dirty.
#[derive(Debug, Clone)]
pub struct InputProfile {
    app_id: AppId,
    buttons: BTreeMap<LogicalButton, PhysicalButton>,
    combos: BTreeMap<ComboId, Chord>,
    dirty: bool,
}

impl InputProfile {
    /// Identity mapping, no combos
    pub fn empty(app_id: AppId) -> Self {
        Self {
            app_id,
            buttons: BTreeMap::new(),
            combos: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Compiled-in defaults: identity mapping plus the stock combos
    pub fn factory(app_id: AppId) -> Self {
        use LogicalButton::*;

        let mut profile = Self::empty(app_id);
        profile.combos = BTreeMap::from([
            (ComboId::ShowOverlay, Chord::from_buttons([ZL, ZR, Plus])),
            (ComboId::Guide, Chord::from_buttons([Minus, Plus])),
            (ComboId::Escape, Chord::from_buttons([ZL, ZR, Minus])),
            (ComboId::Quit, Chord::from_buttons([L, R, Minus])),
        ]);
        profile
    }

    /// Same tables as `other`, rescoped to `app_id` and clean
    pub fn copied_from(other: &InputProfile, app_id: AppId) -> Self {
        Self {
            app_id,
            buttons: other.buttons.clone(),
            combos: other.combos.clone(),
            dirty: false,
        }
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mapped_button(&self, logical: LogicalButton) -> PhysicalButton {
        self.buttons
            .get(&logical)
            .copied()
            .unwrap_or_else(|| PhysicalButton::from(logical))
    }

    /// Setting the identity value clears the override
    pub fn set_mapped_button(&mut self, logical: LogicalButton, physical: PhysicalButton) {
        if physical == PhysicalButton::from(logical) {
            self.buttons.remove(&logical);
        } else {
            self.buttons.insert(logical, physical);
        }
        debug!("App {}: {:?} -> {:?}", self.app_id, logical, physical);
        self.dirty = true;
    }

    /// Stored chord, or an empty one if the combo was never bound
    pub fn combo_buttons(&self, combo: ComboId) -> Chord {
        self.combos.get(&combo).cloned().unwrap_or_default()
    }

    /// The chord must hold exactly `combo.required_len()` distinct buttons;
    /// capture sessions only ever produce such chords.
    pub fn set_combo_buttons(&mut self, combo: ComboId, chord: Chord) {
        debug_assert_eq!(chord.len(), combo.required_len());
        if chord.len() != combo.required_len() {
            error!(
                "Rejecting {}-button chord for {:?}, which needs {}",
                chord.len(),
                combo,
                combo.required_len()
            );
            return;
        }
        debug!("App {}: combo {:?} = {}", self.app_id, combo, chord);
        self.combos.insert(combo, chord);
        self.dirty = true;
    }

    /// Non-identity mapping entries, ordered by logical button
    pub fn button_overrides(&self) -> impl Iterator<Item = (LogicalButton, PhysicalButton)> + '_ {
        self.buttons.iter().map(|(l, p)| (*l, *p))
    }

    pub fn combo_overrides(&self) -> impl Iterator<Item = (ComboId, &Chord)> + '_ {
        self.combos.iter().map(|(c, chord)| (*c, chord))
    }

    /// Short label of what `logical` sends to the target
    pub fn mapped_label(&self, logical: LogicalButton) -> &'static str {
        self.mapped_button(logical).label(true)
    }

    /// Chord of `combo` rendered with the mapped labels of its buttons
    pub fn combo_label(&self, combo: ComboId) -> String {
        self.combo_buttons(combo)
            .compose(" + ", |button| self.mapped_label(button).to_string())
    }

    /// Whether both profiles hold the same overrides, ignoring scope and dirty state
    pub fn same_tables(&self, other: &InputProfile) -> bool {
        self.buttons == other.buttons && self.combos == other.combos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicalButton::*;

    #[test]
    fn unmapped_buttons_are_identity() {
        let profile = InputProfile::factory(0);
        for button in LogicalButton::ALL {
            assert_eq!(profile.mapped_button(*button), PhysicalButton::from(*button));
        }
        assert!(!profile.is_dirty());
    }

    #[test]
    fn set_then_get_returns_override() {
        let mut profile = InputProfile::empty(3);
        profile.set_mapped_button(A, PhysicalButton::X);
        assert_eq!(profile.mapped_button(A), PhysicalButton::X);
        assert_eq!(profile.mapped_label(A), "X");
        assert!(profile.is_dirty());
    }

    #[test]
    fn identity_assignment_clears_override() {
        let mut profile = InputProfile::empty(3);
        profile.set_mapped_button(B, PhysicalButton::Y);
        profile.set_mapped_button(B, PhysicalButton::B);
        assert_eq!(profile.button_overrides().count(), 0);
        assert!(profile.is_dirty());
    }

    #[test]
    fn unset_combo_is_empty() {
        let profile = InputProfile::empty(0);
        assert!(profile.combo_buttons(ComboId::Guide).is_empty());
        assert_eq!(profile.combo_label(ComboId::Guide), "");
    }

    #[test]
    fn factory_combos_have_required_length() {
        let profile = InputProfile::factory(0);
        for combo in ComboId::ALL {
            assert_eq!(profile.combo_buttons(*combo).len(), combo.required_len());
        }
    }

    #[test]
    fn combo_label_uses_mapped_buttons() {
        let mut profile = InputProfile::factory(0);
        profile.set_combo_buttons(ComboId::Guide, Chord::from_buttons([L, R]));
        profile.set_mapped_button(L, PhysicalButton::Back);
        assert_eq!(profile.combo_label(ComboId::Guide), "Back + RB");
    }

    #[test]
    fn copy_is_clean_and_rescoped() {
        let mut source = InputProfile::factory(0);
        source.set_mapped_button(Y, PhysicalButton::A);
        let copy = InputProfile::copied_from(&source, 9);
        assert_eq!(copy.app_id(), 9);
        assert!(!copy.is_dirty());
        assert!(copy.same_tables(&source));
    }
}
