use super::buttons::{LogicalButton, MAX_CHORD_LEN};
use std::fmt;

/// Up to three distinct buttons pressed together as one shortcut.
///
/// Insertion order is kept for display; equality ignores it.
#[derive(Debug, Clone, Default, Eq)]
pub struct Chord {
    buttons: Vec<LogicalButton>,
}

impl Chord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chord from a button list, dropping repeats and anything past
    /// the third distinct button.
    pub fn from_buttons<I>(buttons: I) -> Self
    where
        I: IntoIterator<Item = LogicalButton>,
    {
        let mut chord = Self::new();
        for button in buttons {
            chord.push(button);
        }
        chord
    }

    /// Appends a button; returns false for duplicates or a full chord.
    pub fn push(&mut self, button: LogicalButton) -> bool {
        if self.is_full() || self.contains(button) {
            return false;
        }
        self.buttons.push(button);
        true
    }

    pub fn contains(&self, button: LogicalButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn clear(&mut self) {
        self.buttons.clear();
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buttons.len() >= MAX_CHORD_LEN
    }

    pub fn first(&self) -> Option<LogicalButton> {
        self.buttons.first().copied()
    }

    pub fn buttons(&self) -> &[LogicalButton] {
        &self.buttons
    }

    /// Joins one label per button with `separator`, in capture order
    pub fn compose<F>(&self, separator: &str, label: F) -> String
    where
        F: Fn(LogicalButton) -> String,
    {
        self.buttons
            .iter()
            .map(|button| label(*button))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.buttons.iter().all(|b| other.contains(*b))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.compose(" + ", |button| button.label(true).to_string());
        f.write_str(&text)
    }
}
