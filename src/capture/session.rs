//! Capture session with statum state machine
//!
//! # State Machine
//!
//! ```text
//!             (N distinct presses)         (confirm)
//! Capturing ─────────────────────► Complete ────────► Accepted
//!     ▲                               │
//!     └───────────────────────────────┘
//!                 (cancel, slots cleared)
//! ```
//!
//! Each session fills N slots (1..=3) with distinct logical buttons. Unknown
//! presses and repeats of an already captured button are absorbed without a
//! state change. Acceptance posts a [`CaptureSignal`] to the owner's queue and
//! touches nothing afterwards, so the owner can dispose of the session once
//! the dispatch call has returned.

use super::{CaptureHandle, CaptureKeys, CaptureSignal};
use crate::input::{Chord, InputPress, LogicalButton, MAX_CHORD_LEN};
use statum::{machine, state};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[state]
#[derive(Debug, Clone)]
pub enum CaptureState {
    Capturing,
    Complete,
    Accepted,
}

#[machine]
#[derive(Debug)]
pub struct CaptureSession<S: CaptureState> {
    handle: CaptureHandle,
    required: usize,
    chord: Chord,
    keys: CaptureKeys,
    signal_tx: mpsc::UnboundedSender<CaptureSignal>,
}

impl<S: CaptureState> CaptureSession<S> {
    pub fn handle(&self) -> CaptureHandle {
        self.handle
    }

    pub fn required_len(&self) -> usize {
        self.required
    }

    /// Buttons captured so far, in press order
    pub fn chord(&self) -> &Chord {
        &self.chord
    }
}

impl CaptureSession<Capturing> {
    pub fn create(
        handle: CaptureHandle,
        required: usize,
        keys: CaptureKeys,
        signal_tx: mpsc::UnboundedSender<CaptureSignal>,
    ) -> Self {
        let clamped = required.clamp(1, MAX_CHORD_LEN);
        if clamped != required {
            warn!(
                "Capture {} asked for {} buttons, using {}",
                handle, required, clamped
            );
        }
        debug!("Capture {} started for {} button(s)", handle, clamped);

        Self::new(handle, clamped, Chord::new(), keys, signal_tx)
    }

    /// Places `button` in the next free slot unless it is already captured
    pub fn capture(mut self, button: LogicalButton) -> CaptureFlow {
        if !self.chord.push(button) {
            debug!("Capture {}: {:?} already captured", self.handle, button);
            return CaptureFlow::Capturing(self);
        }

        debug!(
            "Capture {}: slot {}/{} = {:?}",
            self.handle,
            self.chord.len(),
            self.required,
            button
        );

        if self.chord.len() == self.required {
            debug!("Capture {} complete, awaiting confirmation", self.handle);
            CaptureFlow::Complete(self.transition())
        } else {
            CaptureFlow::Capturing(self)
        }
    }
}

impl CaptureSession<Complete> {
    pub fn press(self, button: LogicalButton) -> CaptureFlow {
        if button == self.keys.confirm {
            let handle = self.handle;
            self.confirm().announce();
            CaptureFlow::Accepted(handle)
        } else if button == self.keys.cancel {
            CaptureFlow::Capturing(self.cancel())
        } else {
            debug!("Capture {}: {:?} ignored while complete", self.handle, button);
            CaptureFlow::Complete(self)
        }
    }

    pub fn confirm(self) -> CaptureSession<Accepted> {
        self.transition()
    }

    /// Discards the chord and starts over
    pub fn cancel(mut self) -> CaptureSession<Capturing> {
        debug!("Capture {} cancelled, discarding {}", self.handle, self.chord);
        self.chord.clear();
        self.transition()
    }
}

impl CaptureSession<Accepted> {
    /// Posts the completion signal; the session is spent afterwards
    pub fn announce(self) {
        info!("Capture {} accepted: {}", self.handle, self.chord);
        let signal = CaptureSignal::Accepted {
            handle: self.handle,
            chord: self.chord.clone(),
        };
        if self.signal_tx.send(signal).is_err() {
            warn!("Capture {} accepted but nobody is listening", self.handle);
        }
    }
}

/// Runtime view over the typed session states
#[derive(Debug)]
pub enum CaptureFlow {
    Capturing(CaptureSession<Capturing>),
    Complete(CaptureSession<Complete>),
    /// Terminal; the chord has been handed over
    Accepted(CaptureHandle),
}

impl CaptureFlow {
    pub fn start(
        handle: CaptureHandle,
        required: usize,
        keys: CaptureKeys,
        signal_tx: mpsc::UnboundedSender<CaptureSignal>,
    ) -> Self {
        CaptureFlow::Capturing(CaptureSession::create(handle, required, keys, signal_tx))
    }

    pub fn feed(self, press: InputPress) -> CaptureFlow {
        let button = match press {
            InputPress::Button(button) => button,
            InputPress::Unknown => return self,
        };

        match self {
            CaptureFlow::Capturing(session) => session.capture(button),
            CaptureFlow::Complete(session) => session.press(button),
            CaptureFlow::Accepted(handle) => CaptureFlow::Accepted(handle),
        }
    }

    pub fn chord(&self) -> Option<&Chord> {
        match self {
            CaptureFlow::Capturing(session) => Some(session.chord()),
            CaptureFlow::Complete(session) => Some(session.chord()),
            CaptureFlow::Accepted(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CaptureFlow::Complete(_))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, CaptureFlow::Accepted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicalButton::*;

    fn start(required: usize) -> (CaptureFlow, mpsc::UnboundedReceiver<CaptureSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let flow = CaptureFlow::start(CaptureHandle(7), required, CaptureKeys::default(), tx);
        (flow, rx)
    }

    fn feed_all(mut flow: CaptureFlow, buttons: &[LogicalButton]) -> CaptureFlow {
        for button in buttons {
            flow = flow.feed(InputPress::Button(*button));
        }
        flow
    }

    fn filled(flow: &CaptureFlow) -> usize {
        flow.chord().map(Chord::len).unwrap_or(0)
    }

    #[test]
    fn distinct_presses_complete_any_length() {
        for (required, buttons) in [(1, vec![X]), (2, vec![R, L]), (3, vec![ZL, Up, Y])] {
            let (flow, _rx) = start(required);
            let flow = feed_all(flow, &buttons);
            assert!(flow.is_complete(), "length {} should complete", required);
            assert_eq!(flow.chord().unwrap().buttons(), buttons.as_slice());
        }
    }

    #[test]
    fn repeated_press_does_not_fill_slots() {
        let (flow, _rx) = start(3);
        let flow = feed_all(flow, &[L, L, L]);
        assert_eq!(filled(&flow), 1);
        assert!(!flow.is_complete());
    }

    #[test]
    fn unknown_input_is_ignored() {
        let (flow, _rx) = start(1);
        let flow = flow.feed(InputPress::Unknown);
        assert_eq!(filled(&flow), 0);
        assert!(!flow.is_complete());
    }

    #[test]
    fn confirm_and_cancel_count_as_input_while_capturing() {
        let (flow, mut rx) = start(2);
        let flow = feed_all(flow, &[A, B]);
        assert!(flow.is_complete());
        assert!(rx.try_recv().is_err());
        assert_eq!(flow.chord().unwrap().buttons(), &[A, B]);
    }

    #[test]
    fn cancel_clears_every_slot() {
        let (flow, mut rx) = start(2);
        let flow = feed_all(flow, &[L, R, B]);
        assert!(!flow.is_complete());
        assert_eq!(filled(&flow), 0);
        assert!(rx.try_recv().is_err());

        let flow = feed_all(flow, &[ZL, ZR]);
        assert!(flow.is_complete());
    }

    #[test]
    fn other_buttons_are_ignored_while_complete() {
        let (flow, _rx) = start(1);
        let flow = feed_all(flow, &[X, Y, Up]);
        assert!(flow.is_complete());
        assert_eq!(flow.chord().unwrap().buttons(), &[X]);
    }

    #[test]
    fn confirm_signals_exactly_once() {
        let (flow, mut rx) = start(2);
        let flow = feed_all(flow, &[L, R, A]);
        assert!(flow.is_accepted());

        match rx.try_recv() {
            Ok(CaptureSignal::Accepted { handle, chord }) => {
                assert_eq!(handle, CaptureHandle(7));
                assert_eq!(chord.buttons(), &[L, R]);
            }
            other => panic!("unexpected signal: {:?}", other),
        }

        let flow = feed_all(flow, &[A, A, B, X]);
        assert!(flow.is_accepted());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn confirm_before_complete_is_captured_not_accepted() {
        let (flow, mut rx) = start(2);
        let flow = feed_all(flow, &[L, A]);
        assert!(flow.is_complete());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn out_of_range_length_is_clamped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = CaptureSession::create(CaptureHandle(1), 5, CaptureKeys::default(), tx.clone());
        assert_eq!(session.required_len(), MAX_CHORD_LEN);
        let session = CaptureSession::create(CaptureHandle(2), 0, CaptureKeys::default(), tx);
        assert_eq!(session.required_len(), 1);
    }
}
