//! gilrs-backed raw input source
//!
//! Polled from the UI tick, never on a thread of its own: each call to
//! [`GamepadCollector::poll`] drains at most one gilrs event and converts it
//! into a [`RawInputEvent`] using the standard numbering in [`codes`].

use super::event::{codes, RawInputEvent};
use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gilrs};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum CollectorState {
    Initializing,
    Collecting,
}

#[machine]
pub struct GamepadCollector<S: CollectorState> {
    gilrs: Gilrs,
    events_seen: u64,
}

impl<S: CollectorState> GamepadCollector<S> {
    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }
}

impl GamepadCollector<Initializing> {
    pub fn create() -> Result<Self, CollectorError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(CollectorError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, 0))
    }

    /// Logs what is connected and starts collecting
    pub fn initialize(self) -> GamepadCollector<Collecting> {
        let mut count = 0;
        for (id, gamepad) in self.gilrs.gamepads() {
            count += 1;
            info!("  ID: {}, Name: {}", id, gamepad.name());
        }
        if count == 0 {
            warn!("No gamepad connected, waiting for input anyway");
        } else {
            info!("Found {} gamepads", count);
        }

        self.transition()
    }
}

impl GamepadCollector<Collecting> {
    /// Takes the next gilrs event, if any, and converts it
    pub fn poll(&mut self) -> Option<RawInputEvent> {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            self.events_seen += 1;
            let device = usize::from(id);

            if let Some(raw_event) = convert_event(device, event) {
                if let RawInputEvent::Button {
                    input,
                    pressed: true,
                    ..
                } = raw_event
                {
                    debug!(
                        "Button {} pressed on device {} at {}",
                        input,
                        device,
                        Local::now().format("%H:%M:%S.%3f")
                    );
                }
                return Some(raw_event);
            }
        }
        None
    }
}

fn convert_event(device: usize, event: EventType) -> Option<RawInputEvent> {
    match event {
        EventType::ButtonPressed(button, _) => {
            button_code(button).map(|input| RawInputEvent::Button {
                device,
                input,
                pressed: true,
            })
        }
        EventType::ButtonReleased(button, _) => {
            button_code(button).map(|input| RawInputEvent::Button {
                device,
                input,
                pressed: false,
            })
        }
        // Analog triggers report through ButtonChanged on most pads
        EventType::ButtonChanged(Button::LeftTrigger2, value, _) => Some(RawInputEvent::Axis {
            device,
            axis: codes::AXIS_LEFT_TRIGGER,
            value,
        }),
        EventType::ButtonChanged(Button::RightTrigger2, value, _) => Some(RawInputEvent::Axis {
            device,
            axis: codes::AXIS_RIGHT_TRIGGER,
            value,
        }),
        EventType::AxisChanged(axis, value, _) => axis_code(axis).map(|axis| RawInputEvent::Axis {
            device,
            axis,
            value,
        }),
        EventType::Connected | EventType::Disconnected => {
            debug!("Ignoring connection change on device {}", device);
            None
        }
        _ => None,
    }
}

fn button_code(button: Button) -> Option<u32> {
    match button {
        Button::South => Some(codes::BUTTON_A),
        Button::East => Some(codes::BUTTON_B),
        Button::West => Some(codes::BUTTON_X),
        Button::North => Some(codes::BUTTON_Y),
        Button::LeftTrigger => Some(codes::BUTTON_LEFT_BUMPER),
        Button::RightTrigger => Some(codes::BUTTON_RIGHT_BUMPER),
        Button::Select => Some(codes::BUTTON_BACK),
        Button::Start => Some(codes::BUTTON_START),
        Button::Mode => Some(codes::BUTTON_GUIDE),
        Button::LeftThumb => Some(codes::BUTTON_LEFT_THUMB),
        Button::RightThumb => Some(codes::BUTTON_RIGHT_THUMB),
        Button::DPadUp => Some(codes::BUTTON_DPAD_UP),
        Button::DPadRight => Some(codes::BUTTON_DPAD_RIGHT),
        Button::DPadDown => Some(codes::BUTTON_DPAD_DOWN),
        Button::DPadLeft => Some(codes::BUTTON_DPAD_LEFT),
        // Trigger2 arrives as an axis above
        _ => None,
    }
}

fn axis_code(axis: Axis) -> Option<u32> {
    match axis {
        Axis::LeftStickX => Some(codes::AXIS_LEFT_X),
        Axis::LeftStickY => Some(codes::AXIS_LEFT_Y),
        Axis::RightStickX => Some(codes::AXIS_RIGHT_X),
        Axis::RightStickY => Some(codes::AXIS_RIGHT_Y),
        Axis::LeftZ => Some(codes::AXIS_LEFT_TRIGGER),
        Axis::RightZ => Some(codes::AXIS_RIGHT_TRIGGER),
        _ => None,
    }
}
