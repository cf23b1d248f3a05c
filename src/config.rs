//! Settings for the remap screen
//!
//! Stored as TOML next to the profiles. A missing file means defaults.
//!
//! ```toml
//! confirm_button = "a"
//! cancel_button = "b"
//! profile_dir = "/home/me/.config/padmapper/profiles"
//! tick_interval_ms = 16
//! ```

use crate::capture::CaptureKeys;
use crate::input::LogicalButton;
use crate::profile::TomlDirStorage;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapSettings {
    /// Accepts a complete chord
    pub confirm_button: LogicalButton,
    /// Discards a complete chord and restarts the capture
    pub cancel_button: LogicalButton,
    /// Where profiles live; the platform config dir when unset
    pub profile_dir: Option<PathBuf>,
    /// Input poll period of the CLI loop
    pub tick_interval_ms: u64,
}

impl Default for RemapSettings {
    fn default() -> Self {
        let keys = CaptureKeys::default();
        Self {
            confirm_button: keys.confirm,
            cancel_button: keys.cancel,
            profile_dir: None,
            tick_interval_ms: 16,
        }
    }
}

impl RemapSettings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("padmapper")
            .join("settings.toml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: RemapSettings = toml::from_str(&content)?;
        settings.validate()?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.confirm_button == self.cancel_button {
            return Err(eyre!(
                "confirm_button and cancel_button are both {:?}",
                self.confirm_button
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(eyre!("tick_interval_ms must be positive"));
        }
        Ok(())
    }

    pub fn capture_keys(&self) -> CaptureKeys {
        CaptureKeys {
            confirm: self.confirm_button,
            cancel: self.cancel_button,
        }
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(TomlDirStorage::default_dir)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
