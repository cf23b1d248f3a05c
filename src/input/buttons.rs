//! Button and combo vocabulary
//!
//! Closed enumerations shared by capture, profiles and persistence. The logical
//! side follows the source controller layout, the physical side follows the
//! layout the streamed application expects. Both have the same cardinality and
//! an unmapped logical button resolves to the physical button at the same index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest chord any combo can require
pub const MAX_CHORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} name: {name}")]
pub struct ParseNameError {
    pub kind: &'static str,
    pub name: String,
}

macro_rules! vocabulary {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every value, in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Stable identifier used in config and profile files
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            pub fn index(self) -> usize {
                self as usize
            }
        }

        impl FromStr for $ty {
            type Err = ParseNameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParseNameError {
                        kind: $kind,
                        name: wanted.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Input position on the source controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalButton {
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
    Plus,
    Minus,
    LeftStick,
    RightStick,
    L,
    R,
    ZL,
    ZR,
}

vocabulary!(LogicalButton, "button", {
    A => "a",
    B => "b",
    X => "x",
    Y => "y",
    Up => "up",
    Down => "down",
    Left => "left",
    Right => "right",
    Plus => "plus",
    Minus => "minus",
    LeftStick => "left_stick",
    RightStick => "right_stick",
    L => "l",
    R => "r",
    ZL => "zl",
    ZR => "zr",
});

impl LogicalButton {
    /// Display grouping used when listing the mapping table
    pub const GROUPS: [&'static [LogicalButton]; 4] = [
        &[LogicalButton::A, LogicalButton::B, LogicalButton::X, LogicalButton::Y],
        &[
            LogicalButton::Up,
            LogicalButton::Down,
            LogicalButton::Left,
            LogicalButton::Right,
        ],
        &[
            LogicalButton::Plus,
            LogicalButton::Minus,
            LogicalButton::LeftStick,
            LogicalButton::RightStick,
        ],
        &[LogicalButton::L, LogicalButton::R, LogicalButton::ZL, LogicalButton::ZR],
    ];

    pub fn label(self, short: bool) -> &'static str {
        let (short_label, long_label) = match self {
            LogicalButton::A => ("A", "A Button"),
            LogicalButton::B => ("B", "B Button"),
            LogicalButton::X => ("X", "X Button"),
            LogicalButton::Y => ("Y", "Y Button"),
            LogicalButton::Up => ("Up", "D-Pad Up"),
            LogicalButton::Down => ("Down", "D-Pad Down"),
            LogicalButton::Left => ("Left", "D-Pad Left"),
            LogicalButton::Right => ("Right", "D-Pad Right"),
            LogicalButton::Plus => ("+", "Plus"),
            LogicalButton::Minus => ("-", "Minus"),
            LogicalButton::LeftStick => ("LS", "Left Stick Click"),
            LogicalButton::RightStick => ("RS", "Right Stick Click"),
            LogicalButton::L => ("L", "L Shoulder"),
            LogicalButton::R => ("R", "R Shoulder"),
            LogicalButton::ZL => ("ZL", "ZL Trigger"),
            LogicalButton::ZR => ("ZR", "ZR Trigger"),
        };
        if short {
            short_label
        } else {
            long_label
        }
    }
}

/// Button identity in the layout the streamed application expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalButton {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
}

vocabulary!(PhysicalButton, "physical button", {
    A => "a",
    B => "b",
    X => "x",
    Y => "y",
    DpadUp => "dpad_up",
    DpadDown => "dpad_down",
    DpadLeft => "dpad_left",
    DpadRight => "dpad_right",
    Start => "start",
    Back => "back",
    LeftThumb => "left_thumb",
    RightThumb => "right_thumb",
    LeftShoulder => "left_shoulder",
    RightShoulder => "right_shoulder",
    LeftTrigger => "left_trigger",
    RightTrigger => "right_trigger",
});

impl PhysicalButton {
    pub fn label(self, short: bool) -> &'static str {
        let (short_label, long_label) = match self {
            PhysicalButton::A => ("A", "A Button"),
            PhysicalButton::B => ("B", "B Button"),
            PhysicalButton::X => ("X", "X Button"),
            PhysicalButton::Y => ("Y", "Y Button"),
            PhysicalButton::DpadUp => ("Up", "D-Pad Up"),
            PhysicalButton::DpadDown => ("Down", "D-Pad Down"),
            PhysicalButton::DpadLeft => ("Left", "D-Pad Left"),
            PhysicalButton::DpadRight => ("Right", "D-Pad Right"),
            PhysicalButton::Start => ("Start", "Start"),
            PhysicalButton::Back => ("Back", "Back"),
            PhysicalButton::LeftThumb => ("LS", "Left Stick Click"),
            PhysicalButton::RightThumb => ("RS", "Right Stick Click"),
            PhysicalButton::LeftShoulder => ("LB", "Left Bumper"),
            PhysicalButton::RightShoulder => ("RB", "Right Bumper"),
            PhysicalButton::LeftTrigger => ("LT", "Left Trigger"),
            PhysicalButton::RightTrigger => ("RT", "Right Trigger"),
        };
        if short {
            short_label
        } else {
            long_label
        }
    }
}

// Identity mapping: same index on both sides
impl From<LogicalButton> for PhysicalButton {
    fn from(button: LogicalButton) -> Self {
        PhysicalButton::ALL[button.index()]
    }
}

/// Named shortcut bound to a chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboId {
    ShowOverlay,
    Guide,
    Escape,
    Quit,
}

vocabulary!(ComboId, "combo", {
    ShowOverlay => "show_overlay",
    Guide => "guide",
    Escape => "escape",
    Quit => "quit",
});

impl ComboId {
    /// Number of distinct buttons a complete chord for this combo holds
    pub fn required_len(self) -> usize {
        match self {
            ComboId::Guide => 2,
            ComboId::ShowOverlay | ComboId::Escape | ComboId::Quit => MAX_CHORD_LEN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComboId::ShowOverlay => "Show Overlay",
            ComboId::Guide => "Guide / Home",
            ComboId::Escape => "Escape",
            ComboId::Quit => "Quit Stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("ZL".parse::<LogicalButton>(), Ok(LogicalButton::ZL));
        assert_eq!(" left_stick ".parse::<LogicalButton>(), Ok(LogicalButton::LeftStick));
        assert_eq!("Guide".parse::<ComboId>(), Ok(ComboId::Guide));

        let err = "turbo".parse::<LogicalButton>().unwrap_err();
        assert_eq!(err.kind, "button");
        assert_eq!(err.name, "turbo");
    }

    #[test]
    fn identity_mapping_keeps_index() {
        for button in LogicalButton::ALL {
            let physical = PhysicalButton::from(*button);
            assert_eq!(physical.index(), button.index());
        }
        assert_eq!(PhysicalButton::from(LogicalButton::X), PhysicalButton::X);
        assert_eq!(PhysicalButton::from(LogicalButton::ZR), PhysicalButton::RightTrigger);
    }

    #[test]
    fn groups_cover_every_button_once() {
        let mut seen: Vec<LogicalButton> = LogicalButton::GROUPS.iter().flat_map(|g| g.iter().copied()).collect();
        seen.sort();
        assert_eq!(seen, LogicalButton::ALL.to_vec());
    }

    #[test]
    fn guide_needs_two_buttons() {
        assert_eq!(ComboId::Guide.required_len(), 2);
        assert!(ComboId::ALL
            .iter()
            .all(|combo| (1..=MAX_CHORD_LEN).contains(&combo.required_len())));
    }

    #[test]
    fn serde_names_match_file_names() {
        #[derive(Serialize)]
        struct Probe {
            button: LogicalButton,
        }
        let text = toml::to_string(&Probe {
            button: LogicalButton::LeftStick,
        })
        .unwrap();
        assert_eq!(text.trim(), format!("button = \"{}\"", LogicalButton::LeftStick.name()));
    }
}
