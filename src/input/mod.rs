//! Controller input vocabulary and routing
//!
//! ```text
//! RawInputEvent ──► InputNormalizer ──► InputPress ──► InputFocus ──► capture / navigation
//! ```

pub mod buttons;
pub mod chord;
#[cfg(feature = "gamepad")]
pub mod collector;
pub mod event;
pub mod focus;

pub use buttons::{ComboId, LogicalButton, ParseNameError, PhysicalButton, MAX_CHORD_LEN};
pub use chord::Chord;
pub use event::{DeviceLayout, InputNormalizer, InputPress, RawInputEvent};
pub use focus::InputFocus;
