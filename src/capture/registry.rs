use super::session::CaptureFlow;
use super::{CaptureHandle, CaptureKeys, CaptureSignal};
use crate::input::{Chord, InputPress, LogicalButton};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct CaptureSlot<H> {
    prompt: String,
    // None only while a press is being fed through
    flow: Option<CaptureFlow>,
    handler: Option<H>,
}

/// Finished capture, already removed from the registry
#[derive(Debug)]
pub struct Completion<H> {
    pub handle: CaptureHandle,
    pub handler: Option<H>,
    pub chord: Chord,
}

/// Owns every open capture session.
///
/// `H` is whatever the owner wants back on completion: a rebind target, a
/// boxed closure, or anything else.
pub struct CaptureRegistry<H> {
    sessions: HashMap<CaptureHandle, CaptureSlot<H>>,
    next_id: u64,
    keys: CaptureKeys,
    signal_tx: mpsc::UnboundedSender<CaptureSignal>,
    signal_rx: mpsc::UnboundedReceiver<CaptureSignal>,
}

impl<H> CaptureRegistry<H> {
    pub fn new(keys: CaptureKeys) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self {
            sessions: HashMap::new(),
            next_id: 1,
            keys,
            signal_tx,
            signal_rx,
        }
    }

    pub fn start_capture(&mut self, prompt: impl Into<String>, required_len: usize) -> CaptureHandle {
        let handle = CaptureHandle(self.next_id);
        self.next_id += 1;

        let prompt = prompt.into();
        info!("Opening capture {}: {}", handle, prompt);
        let flow = CaptureFlow::start(handle, required_len, self.keys, self.signal_tx.clone());
        self.sessions.insert(
            handle,
            CaptureSlot {
                prompt,
                flow: Some(flow),
                handler: None,
            },
        );
        handle
    }

    /// Attaches what to hand back when `handle` completes. Returns false for
    /// unknown handles.
    pub fn set_completion_handler(&mut self, handle: CaptureHandle, handler: H) -> bool {
        match self.sessions.get_mut(&handle) {
            Some(slot) => {
                slot.handler = Some(handler);
                true
            }
            None => {
                warn!("No capture {} to attach a completion handler to", handle);
                false
            }
        }
    }

    /// Feeds one press to a session. Returns false if the handle is not open.
    pub fn dispatch(&mut self, handle: CaptureHandle, press: InputPress) -> bool {
        let Some(slot) = self.sessions.get_mut(&handle) else {
            debug!("Press for closed capture {} dropped", handle);
            return false;
        };
        if let Some(flow) = slot.flow.take() {
            slot.flow = Some(flow.feed(press));
        }
        true
    }

    /// Drains accepted signals and disposes of the sessions that sent them
    pub fn take_completions(&mut self) -> Vec<Completion<H>> {
        let mut completions = Vec::new();
        while let Ok(signal) = self.signal_rx.try_recv() {
            let CaptureSignal::Accepted { handle, chord } = signal;
            match self.sessions.remove(&handle) {
                Some(slot) => {
                    debug!("Capture {} disposed after acceptance", handle);
                    completions.push(Completion {
                        handle,
                        handler: slot.handler,
                        chord,
                    });
                }
                None => debug!("Capture {} was disposed before its result arrived", handle),
            }
        }
        completions
    }

    pub fn dispose(&mut self, handle: CaptureHandle) -> bool {
        let removed = self.sessions.remove(&handle).is_some();
        if removed {
            debug!("Capture {} disposed", handle);
        }
        removed
    }

    pub fn is_open(&self, handle: CaptureHandle) -> bool {
        self.sessions.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn prompt(&self, handle: CaptureHandle) -> Option<&str> {
        self.sessions.get(&handle).map(|slot| slot.prompt.as_str())
    }

    /// Text shown over the screen while `handle` is capturing: the prompt,
    /// the chord so far and, once complete, how to confirm or cancel.
    pub fn overlay_lines(&self, handle: CaptureHandle) -> Option<Vec<String>> {
        let slot = self.sessions.get(&handle)?;
        let mut lines = vec![slot.prompt.clone()];

        let Some(flow) = slot.flow.as_ref() else {
            return Some(lines);
        };
        if let Some(chord) = flow.chord().filter(|chord| !chord.is_empty()) {
            lines.push(chord.compose(" + ", quoted));
            if flow.is_complete() {
                lines.push(format!(
                    "Press {} to confirm, {} to cancel.",
                    quoted(self.keys.confirm),
                    quoted(self.keys.cancel)
                ));
            }
        }
        Some(lines)
    }
}

fn quoted(button: LogicalButton) -> String {
    format!("\"{}\"", button.label(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicalButton::*;

    fn press(registry: &mut CaptureRegistry<&'static str>, handle: CaptureHandle, buttons: &[LogicalButton]) {
        for button in buttons {
            assert!(registry.dispatch(handle, InputPress::Button(*button)));
        }
    }

    #[test]
    fn completion_carries_handler_and_disposes() {
        let mut registry = CaptureRegistry::new(CaptureKeys::default());
        let handle = registry.start_capture("Press a combo", 2);
        assert!(registry.set_completion_handler(handle, "guide"));

        press(&mut registry, handle, &[L, R]);
        assert!(registry.take_completions().is_empty());

        press(&mut registry, handle, &[A]);
        let completions = registry.take_completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].handle, handle);
        assert_eq!(completions[0].handler, Some("guide"));
        assert_eq!(completions[0].chord.buttons(), &[L, R]);

        assert!(!registry.is_open(handle));
        assert!(!registry.dispatch(handle, InputPress::Button(A)));
        assert!(registry.take_completions().is_empty());
    }

    #[test]
    fn disposed_session_never_completes() {
        let mut registry: CaptureRegistry<&'static str> = CaptureRegistry::new(CaptureKeys::default());
        let handle = registry.start_capture("Press a button", 1);
        press(&mut registry, handle, &[X, A]);
        assert!(registry.dispose(handle));
        assert!(registry.take_completions().is_empty());
        assert!(!registry.dispose(handle));
    }

    #[test]
    fn closures_work_as_handlers() {
        let mut registry: CaptureRegistry<Box<dyn FnOnce(&Chord) -> String>> =
            CaptureRegistry::new(CaptureKeys::default());
        let handle = registry.start_capture("Press a button", 1);
        registry.set_completion_handler(handle, Box::new(|chord: &Chord| chord.to_string()));

        registry.dispatch(handle, InputPress::Button(Y));
        registry.dispatch(handle, InputPress::Button(A));

        let mut completions = registry.take_completions();
        let completion = completions.pop().unwrap();
        let handler = completion.handler.unwrap();
        assert_eq!(handler(&completion.chord), "Y");
    }

    #[test]
    fn overlay_shows_progress_and_instructions() {
        let mut registry: CaptureRegistry<()> = CaptureRegistry::new(CaptureKeys::default());
        let handle = registry.start_capture("Press the button combination for \"Guide / Home\"", 2);
        assert_eq!(registry.overlay_lines(handle).unwrap().len(), 1);

        registry.dispatch(handle, InputPress::Button(Minus));
        assert_eq!(registry.overlay_lines(handle).unwrap()[1], "\"-\"");

        registry.dispatch(handle, InputPress::Button(Plus));
        let lines = registry.overlay_lines(handle).unwrap();
        assert_eq!(lines[1], "\"-\" + \"+\"");
        assert_eq!(lines[2], "Press \"A\" to confirm, \"B\" to cancel.");
    }

    #[test]
    fn handles_are_unique() {
        let mut registry: CaptureRegistry<()> = CaptureRegistry::new(CaptureKeys::default());
        let first = registry.start_capture("one", 1);
        let second = registry.start_capture("two", 1);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.prompt(second), Some("two"));
    }
}
