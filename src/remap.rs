//! Remap screen controller
//!
//! Ties capture sessions to one profile. The screen owns the input focus:
//! while a capture is open every press goes to it, otherwise presses come
//! back to the caller as navigation.
//!
//! ```text
//! raw event ─► normalizer ─► focus? ─yes─► capture registry ─► completions ─► profile
//!                              │
//!                              no──► Routed::Navigation
//! ```

use crate::capture::{CaptureHandle, CaptureRegistry, Completion};
use crate::config::RemapSettings;
use crate::input::{
    ComboId, InputFocus, InputNormalizer, InputPress, LogicalButton, PhysicalButton,
    RawInputEvent,
};
use crate::profile::{AppId, InputProfile, ProfileStorage, ProfileStore, StorageError};
use tracing::{debug, error, info, warn};

/// What a capture rebinds once accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapTarget {
    Button(LogicalButton),
    Combo(ComboId),
}

/// Where one press ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Consumed by the capture holding focus
    Captured(CaptureHandle),
    /// No capture open; the press is the caller's to handle
    Navigation(LogicalButton),
    /// Not a press, or not a known button
    Ignored,
}

pub struct RemapScreen<'a, S: ProfileStorage> {
    app_id: AppId,
    store: &'a mut ProfileStore<S>,
    captures: CaptureRegistry<RemapTarget>,
    focus: InputFocus,
    normalizer: InputNormalizer,
    closed: bool,
}

impl<'a, S: ProfileStorage> RemapScreen<'a, S> {
    /// Opens the screen for `app_id`. A profile already held by the store,
    /// including unsaved edits, is kept; otherwise it is loaded.
    pub fn new(store: &'a mut ProfileStore<S>, app_id: AppId, settings: &RemapSettings) -> Self {
        store.profile_mut(app_id);
        info!("Remap screen opened for app {}", app_id);

        Self {
            app_id,
            store,
            captures: CaptureRegistry::new(settings.capture_keys()),
            focus: InputFocus::new(),
            normalizer: InputNormalizer::default(),
            closed: false,
        }
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// Profile being edited; resolved when the screen opened
    pub fn profile(&self) -> Option<&InputProfile> {
        self.store.profile(self.app_id)
    }

    pub fn active_capture(&self) -> Option<CaptureHandle> {
        self.focus.active()
    }

    /// Starts a one-button capture whose result becomes what `logical` sends
    pub fn assign_button(&mut self, logical: LogicalButton) -> CaptureHandle {
        let prompt = format!("Press the button to map to \"{}\"", logical.label(false));
        self.open_capture(prompt, 1, RemapTarget::Button(logical))
    }

    /// Starts a capture for `combo` with the combo's own chord length
    pub fn assign_combo(&mut self, combo: ComboId) -> CaptureHandle {
        let prompt = format!("Press the button combination for \"{}\"", combo.label());
        self.open_capture(prompt, combo.required_len(), RemapTarget::Combo(combo))
    }

    /// Drops the capture holding focus without touching the profile
    pub fn abort_capture(&mut self) -> bool {
        let Some(handle) = self.focus.active() else {
            return false;
        };
        info!("Capture {} aborted", handle);
        self.focus.release(handle);
        self.captures.dispose(handle)
    }

    pub fn handle_raw_event(&mut self, event: &RawInputEvent) -> Routed {
        match self.normalizer.normalize(event) {
            Some(press) => self.handle_press(press),
            None => Routed::Ignored,
        }
    }

    pub fn handle_press(&mut self, press: InputPress) -> Routed {
        let Some(handle) = self.focus.active() else {
            return match press {
                InputPress::Button(button) => Routed::Navigation(button),
                InputPress::Unknown => Routed::Ignored,
            };
        };

        self.captures.dispatch(handle, press);
        for completion in self.captures.take_completions() {
            self.focus.release(completion.handle);
            self.on_completion(completion);
        }
        Routed::Captured(handle)
    }

    /// Restores defaults for this screen's scope and persists them
    pub fn reset(&mut self) -> Result<(), StorageError> {
        if let Some(handle) = self.focus.active() {
            self.focus.release(handle);
            self.captures.dispose(handle);
        }
        self.store.reset(self.app_id).inspect_err(|e| {
            error!("Failed to persist reset of profile {}: {}", self.app_id, e);
        })
    }

    /// Saves the profile if it changed; returns whether a write happened
    pub fn close(mut self) -> Result<bool, StorageError> {
        self.closed = true;
        self.save_if_dirty()
    }

    /// Text to draw over the screen while a capture is open
    pub fn overlay_lines(&self) -> Option<Vec<String>> {
        self.captures.overlay_lines(self.focus.active()?)
    }

    /// Logical buttons in display columns, each with its current mapped label
    pub fn button_rows(&self) -> Vec<Vec<(LogicalButton, &'static str)>> {
        let Some(profile) = self.profile() else {
            return Vec::new();
        };
        LogicalButton::GROUPS
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|button| (*button, profile.mapped_label(*button)))
                    .collect()
            })
            .collect()
    }

    /// Every combo with its chord rendered through the current mapping
    pub fn combo_rows(&self) -> Vec<(ComboId, String)> {
        let Some(profile) = self.profile() else {
            return Vec::new();
        };
        ComboId::ALL
            .iter()
            .map(|combo| (*combo, profile.combo_label(*combo)))
            .collect()
    }

    fn open_capture(&mut self, prompt: String, len: usize, target: RemapTarget) -> CaptureHandle {
        if let Some(previous) = self.focus.active() {
            warn!("Capture {} replaced by a new capture", previous);
            self.focus.release(previous);
            self.captures.dispose(previous);
        }

        let handle = self.captures.start_capture(prompt, len);
        self.captures.set_completion_handler(handle, target);
        self.focus.push(handle);
        handle
    }

    fn on_completion(&mut self, completion: Completion<RemapTarget>) {
        let Some(target) = completion.handler else {
            warn!("Capture {} finished without a target", completion.handle);
            return;
        };
        let profile = self.store.profile_mut(self.app_id);

        match target {
            RemapTarget::Button(logical) => {
                let Some(captured) = completion.chord.first() else {
                    return;
                };
                let physical = PhysicalButton::from(captured);
                if profile.mapped_button(logical) == physical {
                    debug!("{:?} already sends {:?}", logical, physical);
                    return;
                }
                info!("App {}: {:?} now sends {:?}", self.app_id, logical, physical);
                profile.set_mapped_button(logical, physical);
            }
            RemapTarget::Combo(combo) => {
                if profile.combo_buttons(combo) == completion.chord {
                    debug!("Combo {:?} unchanged", combo);
                    return;
                }
                info!("App {}: combo {:?} = {}", self.app_id, combo, completion.chord);
                profile.set_combo_buttons(combo, completion.chord);
            }
        }
    }

    fn save_if_dirty(&mut self) -> Result<bool, StorageError> {
        self.store.save(self.app_id)
    }
}

impl<S: ProfileStorage> Drop for RemapScreen<'_, S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.save_if_dirty() {
            error!("Failed to save profile {} on teardown: {}", self.app_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryStorage;
    use LogicalButton::*;

    fn press_all(screen: &mut RemapScreen<'_, MemoryStorage>, buttons: &[LogicalButton]) {
        for button in buttons {
            screen.handle_press(InputPress::Button(*button));
        }
    }

    #[test]
    fn presses_without_capture_are_navigation() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());
        assert_eq!(screen.handle_press(InputPress::Button(Down)), Routed::Navigation(Down));
        assert_eq!(screen.handle_press(InputPress::Unknown), Routed::Ignored);
    }

    #[test]
    fn capture_swallows_navigation() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());
        let handle = screen.assign_combo(ComboId::Quit);

        assert_eq!(screen.handle_press(InputPress::Button(Down)), Routed::Captured(handle));
        assert_eq!(screen.handle_press(InputPress::Unknown), Routed::Captured(handle));
    }

    #[test]
    fn rebind_a_to_x() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        {
            let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());
            screen.assign_button(A);
            assert_eq!(
                screen.overlay_lines().unwrap()[0],
                "Press the button to map to \"A Button\""
            );
            press_all(&mut screen, &[X, A]);

            assert_eq!(screen.active_capture(), None);
            assert_eq!(screen.profile().unwrap().mapped_button(A), PhysicalButton::X);
            assert_eq!(screen.profile().unwrap().mapped_label(A), "X");
            assert!(screen.close().unwrap());
        }
        assert_eq!(store.storage().writes(), 1);
    }

    #[test]
    fn unchanged_result_leaves_profile_clean() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());

        screen.assign_button(Y);
        press_all(&mut screen, &[Y, A]);
        screen.assign_combo(ComboId::Guide);
        press_all(&mut screen, &[Plus, Minus, A]);

        assert!(!screen.profile().unwrap().is_dirty());
        assert!(!screen.close().unwrap());
    }

    #[test]
    fn drop_saves_dirty_profile() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        {
            let mut screen = RemapScreen::new(&mut store, 8, &RemapSettings::default());
            screen.assign_combo(ComboId::Guide);
            press_all(&mut screen, &[L, R, A]);
        }
        assert_eq!(store.storage().writes(), 1);
        assert_eq!(store.profile(8).unwrap().combo_buttons(ComboId::Guide).buttons(), &[L, R]);
    }

    #[test]
    fn abort_leaves_profile_untouched() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());
        screen.assign_button(B);
        press_all(&mut screen, &[X]);
        assert!(screen.abort_capture());
        assert!(!screen.abort_capture());
        assert_eq!(screen.handle_press(InputPress::Button(A)), Routed::Navigation(A));
        assert_eq!(screen.profile().unwrap().mapped_button(B), PhysicalButton::B);
    }

    #[test]
    fn custom_confirm_key_from_settings() {
        let settings = RemapSettings {
            confirm_button: Plus,
            cancel_button: Minus,
            ..RemapSettings::default()
        };
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &settings);
        screen.assign_button(R);
        press_all(&mut screen, &[ZR, A]);
        assert!(screen.active_capture().is_some());

        press_all(&mut screen, &[Plus]);
        assert_eq!(screen.profile().unwrap().mapped_button(R), PhysicalButton::RightTrigger);
    }

    #[test]
    fn combo_rows_follow_mapping() {
        let mut store = ProfileStore::new(MemoryStorage::new());
        let mut screen = RemapScreen::new(&mut store, 0, &RemapSettings::default());
        screen.assign_button(Minus);
        press_all(&mut screen, &[Y, A]);

        let rows = screen.combo_rows();
        let guide = rows.iter().find(|(combo, _)| *combo == ComboId::Guide).unwrap();
        assert_eq!(guide.1, "Y + Start");
        assert_eq!(screen.button_rows().len(), 4);
    }
}
