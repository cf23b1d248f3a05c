//! Interactive chord capture
//!
//! A capture turns a stream of presses into a confirmed chord of 1 to 3
//! distinct buttons. Sessions live in a [`CaptureRegistry`]; completion is
//! two-phase: the session posts a [`CaptureSignal`] and the registry owner
//! collects it with [`CaptureRegistry::take_completions`] after the dispatch
//! call has returned, disposing of the session at that point.

pub mod registry;
pub mod session;

pub use registry::{CaptureRegistry, Completion};
pub use session::{CaptureFlow, CaptureSession};

use crate::input::{Chord, LogicalButton};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureHandle(pub u64);

impl fmt::Display for CaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Buttons reserved for confirming and discarding a complete chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureKeys {
    pub confirm: LogicalButton,
    pub cancel: LogicalButton,
}

impl Default for CaptureKeys {
    fn default() -> Self {
        Self {
            confirm: LogicalButton::A,
            cancel: LogicalButton::B,
        }
    }
}

/// Message from a session to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureSignal {
    Accepted { handle: CaptureHandle, chord: Chord },
}
