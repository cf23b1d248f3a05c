//! Profile resolution with default fallback
//!
//! ```text
//! load(app)  : stored record ─► else app == 0 ? factory : copy of default profile
//! save(app)  : write iff dirty, clean on success
//! reset(0)   : factory defaults, written at once
//! reset(app) : copy of the current default profile, written at once
//! ```

use super::{AppId, InputProfile, ProfileRecord, ProfileStorage, StorageError, DEFAULT_APP_ID};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Loaded profiles plus the storage they persist to.
///
/// Created by whoever owns the input-settings screen and handed to it; lives
/// as long as that screen does.
pub struct ProfileStore<S: ProfileStorage> {
    storage: S,
    profiles: HashMap<AppId, InputProfile>,
}

impl<S: ProfileStorage> ProfileStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            profiles: HashMap::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Resolves the profile for `app_id` from storage, replacing any copy
    /// already in memory. Storage problems degrade to the fallback path.
    pub fn load(&mut self, app_id: AppId) -> &mut InputProfile {
        let profile = match self.read_stored(app_id) {
            Some(profile) => {
                info!("Loaded stored profile for app {}", app_id);
                profile
            }
            None if app_id == DEFAULT_APP_ID => {
                info!("No stored default profile, using factory defaults");
                InputProfile::factory(DEFAULT_APP_ID)
            }
            None => {
                info!("No stored profile for app {}, falling back to defaults", app_id);
                InputProfile::copied_from(self.current_default(), app_id)
            }
        };

        self.profiles.insert(app_id, profile);
        self.loaded_mut(app_id)
    }

    /// Profile already in memory, or resolved through [`load`](Self::load)
    pub fn profile_mut(&mut self, app_id: AppId) -> &mut InputProfile {
        if !self.profiles.contains_key(&app_id) {
            return self.load(app_id);
        }
        self.loaded_mut(app_id)
    }

    pub fn profile(&self, app_id: AppId) -> Option<&InputProfile> {
        self.profiles.get(&app_id)
    }

    /// Writes the in-memory profile iff it is dirty. Returns whether a write
    /// happened; on failure the profile stays dirty.
    pub fn save(&mut self, app_id: AppId) -> Result<bool, StorageError> {
        let Some(profile) = self.profiles.get_mut(&app_id) else {
            debug!("Nothing loaded for app {}, nothing to save", app_id);
            return Ok(false);
        };
        if !profile.is_dirty() {
            debug!("Profile {} unchanged, skipping save", app_id);
            return Ok(false);
        }

        let record = ProfileRecord::from_profile(profile);
        self.storage.write(app_id, &record)?;
        profile.mark_clean();
        Ok(true)
    }

    /// Restores defaults for `app_id` and persists immediately. If the write
    /// fails the reset profile stays dirty, so the next save writes it.
    pub fn reset(&mut self, app_id: AppId) -> Result<(), StorageError> {
        let mut profile = if app_id == DEFAULT_APP_ID {
            info!("Resetting default profile to factory defaults");
            InputProfile::factory(DEFAULT_APP_ID)
        } else {
            info!("Resetting profile {} to the default profile", app_id);
            InputProfile::copied_from(self.current_default(), app_id)
        };

        profile.mark_dirty();
        self.profiles.insert(app_id, profile);
        self.save(app_id).map(|_| ())
    }

    /// Default profile as currently in memory, loading it if needed
    fn current_default(&mut self) -> &InputProfile {
        self.profile_mut(DEFAULT_APP_ID)
    }

    fn read_stored(&self, app_id: AppId) -> Option<InputProfile> {
        match self.storage.read(app_id) {
            Ok(record) => record.map(|record| record.to_profile(app_id)),
            Err(e) => {
                warn!("Could not read profile {}: {}", app_id, e);
                None
            }
        }
    }

    fn loaded_mut(&mut self, app_id: AppId) -> &mut InputProfile {
        self.profiles
            .entry(app_id)
            .or_insert_with(|| InputProfile::empty(app_id))
    }
}
