use crate::capture::CaptureHandle;
use tracing::{debug, warn};

/// Which capture, if any, owns controller input.
///
/// Owned by the screen that opens captures. While non-empty, every press goes
/// to the top entry and nothing reaches regular navigation.
#[derive(Debug, Default)]
pub struct InputFocus {
    stack: Vec<CaptureHandle>,
}

impl InputFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: CaptureHandle) {
        if self.stack.contains(&handle) {
            warn!("Capture {} already holds input focus", handle);
            return;
        }
        debug!("Input focus -> capture {}", handle);
        self.stack.push(handle);
    }

    /// Removes `handle` wherever it sits; returns false if it held no focus
    pub fn release(&mut self, handle: CaptureHandle) -> bool {
        let before = self.stack.len();
        self.stack.retain(|h| *h != handle);
        let released = self.stack.len() != before;
        if released {
            debug!("Capture {} released input focus", handle);
        }
        released
    }

    pub fn active(&self) -> Option<CaptureHandle> {
        self.stack.last().copied()
    }

    pub fn is_captured(&self) -> bool {
        !self.stack.is_empty()
    }
}
