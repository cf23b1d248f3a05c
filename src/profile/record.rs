//! On-disk layout of one profile
//!
//! ```toml
//! version = 1
//!
//! [[buttons]]
//! logical = "a"
//! physical = "x"
//!
//! [[combos]]
//! combo = "guide"
//! buttons = ["l", "r"]
//! ```
//!
//! Names are kept as plain strings so that a file written by a newer build,
//! or edited by hand, still loads: entries that do not resolve are skipped.

use super::{AppId, InputProfile};
use crate::input::{Chord, ComboId, LogicalButton, PhysicalButton};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const PROFILE_RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonOverride {
    pub logical: String,
    pub physical: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboOverride {
    pub combo: String,
    pub buttons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub version: u32,
    #[serde(default)]
    pub buttons: Vec<ButtonOverride>,
    #[serde(default)]
    pub combos: Vec<ComboOverride>,
}

impl ProfileRecord {
    pub fn from_profile(profile: &InputProfile) -> Self {
        let buttons = profile
            .button_overrides()
            .map(|(logical, physical)| ButtonOverride {
                logical: logical.name().to_string(),
                physical: physical.name().to_string(),
            })
            .collect();
        let combos = profile
            .combo_overrides()
            .filter(|(_, chord)| !chord.is_empty())
            .map(|(combo, chord)| ComboOverride {
                combo: combo.name().to_string(),
                buttons: chord.buttons().iter().map(|b| b.name().to_string()).collect(),
            })
            .collect();

        Self {
            version: PROFILE_RECORD_VERSION,
            buttons,
            combos,
        }
    }

    /// Rebuilds a clean profile, dropping entries that do not resolve
    pub fn to_profile(&self, app_id: AppId) -> InputProfile {
        if self.version > PROFILE_RECORD_VERSION {
            warn!(
                "Profile {} has version {}, newer than {}; loading what is understood",
                app_id, self.version, PROFILE_RECORD_VERSION
            );
        }

        let mut profile = InputProfile::empty(app_id);

        for entry in &self.buttons {
            let logical = entry.logical.parse::<LogicalButton>();
            let physical = entry.physical.parse::<PhysicalButton>();
            match (logical, physical) {
                (Ok(logical), Ok(physical)) => profile.set_mapped_button(logical, physical),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Profile {}: skipping button override: {}", app_id, e)
                }
            }
        }

        for entry in &self.combos {
            let combo = match entry.combo.parse::<ComboId>() {
                Ok(combo) => combo,
                Err(e) => {
                    warn!("Profile {}: skipping combo: {}", app_id, e);
                    continue;
                }
            };
            match parse_chord(&entry.buttons) {
                Ok(chord) if chord.len() == entry.buttons.len()
                    && chord.len() == combo.required_len() =>
                {
                    profile.set_combo_buttons(combo, chord)
                }
                Ok(_) => warn!(
                    "Profile {}: skipping combo {}, needs {} distinct buttons, got {:?}",
                    app_id,
                    combo,
                    combo.required_len(),
                    entry.buttons
                ),
                Err(e) => warn!("Profile {}: skipping combo {}: {}", app_id, combo, e),
            }
        }

        profile.mark_clean();
        profile
    }
}

fn parse_chord(names: &[String]) -> Result<Chord, crate::input::ParseNameError> {
    let buttons = names
        .iter()
        .map(|name| name.parse::<LogicalButton>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Chord::from_buttons(buttons))
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicalButton::*;

    #[test]
    fn only_overrides_are_written() {
        let mut profile = InputProfile::empty(4);
        profile.set_mapped_button(A, PhysicalButton::X);
        profile.set_mapped_button(B, PhysicalButton::B);
        profile.set_combo_buttons(ComboId::Guide, Chord::from_buttons([L, R]));

        let record = ProfileRecord::from_profile(&profile);
        assert_eq!(record.version, PROFILE_RECORD_VERSION);
        assert_eq!(
            record.buttons,
            vec![ButtonOverride {
                logical: "a".into(),
                physical: "x".into()
            }]
        );
        assert_eq!(record.combos[0].buttons, vec!["l".to_string(), "r".to_string()]);

        let restored = record.to_profile(4);
        assert!(restored.same_tables(&profile));
        assert!(!restored.is_dirty());
    }

    #[test]
    fn unknown_and_malformed_entries_are_skipped() {
        let text = r#"
version = 2

[[buttons]]
logical = "a"
physical = "turbo"

[[buttons]]
logical = "zl"
physical = "left_shoulder"

[[buttons]]
logical = "zl"
physical = "right_shoulder"

[[combos]]
combo = "guide"
buttons = ["l", "l"]

[[combos]]
combo = "quit"
buttons = ["l", "r"]

[[combos]]
combo = "screenshot"
buttons = ["x"]

[[combos]]
combo = "escape"
buttons = ["plus", "minus", "y"]

[[combos]]
combo = "escape"
buttons = ["l", "r", "x"]

[[combos]]
combo = "escape"
buttons = ["l", "r"]
"#;
        let record: ProfileRecord = toml::from_str(text).unwrap();
        let profile = record.to_profile(1);

        assert_eq!(profile.mapped_button(A), PhysicalButton::A);
        assert_eq!(profile.mapped_button(ZL), PhysicalButton::RightShoulder);
        assert!(profile.combo_buttons(ComboId::Guide).is_empty());
        assert!(profile.combo_buttons(ComboId::Quit).is_empty());
        assert_eq!(profile.combo_buttons(ComboId::Escape).buttons(), &[L, R, X]);
    }

    #[test]
    fn missing_tables_default_to_empty() {
        let record: ProfileRecord = toml::from_str("version = 1").unwrap();
        let profile = record.to_profile(0);
        assert_eq!(profile.button_overrides().count(), 0);
        assert_eq!(profile.combo_overrides().count(), 0);
    }
}
