//! Raw controller events and their normalisation into logical presses
//!
//! The raw source delivers digital transitions and analog axis values. Only
//! two things count as a press: a digital button going down, and an analog
//! axis rising from non-positive to positive. Everything else is dropped here.

use super::buttons::LogicalButton;
use std::collections::HashMap;
use tracing::{debug, trace};

pub type DeviceId = usize;

/// Common gamepad numbering used by the standard layout
pub mod codes {
    pub const BUTTON_A: u32 = 0;
    pub const BUTTON_B: u32 = 1;
    pub const BUTTON_X: u32 = 2;
    pub const BUTTON_Y: u32 = 3;
    pub const BUTTON_LEFT_BUMPER: u32 = 4;
    pub const BUTTON_RIGHT_BUMPER: u32 = 5;
    pub const BUTTON_BACK: u32 = 6;
    pub const BUTTON_START: u32 = 7;
    pub const BUTTON_GUIDE: u32 = 8;
    pub const BUTTON_LEFT_THUMB: u32 = 9;
    pub const BUTTON_RIGHT_THUMB: u32 = 10;
    pub const BUTTON_DPAD_UP: u32 = 11;
    pub const BUTTON_DPAD_RIGHT: u32 = 12;
    pub const BUTTON_DPAD_DOWN: u32 = 13;
    pub const BUTTON_DPAD_LEFT: u32 = 14;

    pub const AXIS_LEFT_X: u32 = 0;
    pub const AXIS_LEFT_Y: u32 = 1;
    pub const AXIS_RIGHT_X: u32 = 2;
    pub const AXIS_RIGHT_Y: u32 = 3;
    pub const AXIS_LEFT_TRIGGER: u32 = 4;
    pub const AXIS_RIGHT_TRIGGER: u32 = 5;
}

/// Event as delivered by the raw gamepad source, one per tick at most
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Button {
        device: DeviceId,
        input: u32,
        pressed: bool,
    },
    Axis {
        device: DeviceId,
        axis: u32,
        value: f32,
    },
}

/// A press after layout lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPress {
    Button(LogicalButton),
    /// Recognised as a press but not part of the layout
    Unknown,
}

/// Raw input id → logical button table for one kind of device
#[derive(Debug, Clone)]
pub struct DeviceLayout {
    buttons: HashMap<u32, LogicalButton>,
    axes: HashMap<u32, LogicalButton>,
}

impl DeviceLayout {
    pub fn standard() -> Self {
        use codes::*;

        let buttons = HashMap::from([
            (BUTTON_A, LogicalButton::A),
            (BUTTON_B, LogicalButton::B),
            (BUTTON_X, LogicalButton::X),
            (BUTTON_Y, LogicalButton::Y),
            (BUTTON_LEFT_BUMPER, LogicalButton::L),
            (BUTTON_RIGHT_BUMPER, LogicalButton::R),
            (BUTTON_BACK, LogicalButton::Minus),
            (BUTTON_START, LogicalButton::Plus),
            (BUTTON_LEFT_THUMB, LogicalButton::LeftStick),
            (BUTTON_RIGHT_THUMB, LogicalButton::RightStick),
            (BUTTON_DPAD_UP, LogicalButton::Up),
            (BUTTON_DPAD_RIGHT, LogicalButton::Right),
            (BUTTON_DPAD_DOWN, LogicalButton::Down),
            (BUTTON_DPAD_LEFT, LogicalButton::Left),
        ]);
        let axes = HashMap::from([
            (AXIS_LEFT_TRIGGER, LogicalButton::ZL),
            (AXIS_RIGHT_TRIGGER, LogicalButton::ZR),
        ]);

        Self { buttons, axes }
    }

    pub fn button(&self, input: u32) -> Option<LogicalButton> {
        self.buttons.get(&input).copied()
    }

    pub fn axis(&self, axis: u32) -> Option<LogicalButton> {
        self.axes.get(&axis).copied()
    }
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Turns raw events into presses, tracking analog levels per device and axis
#[derive(Debug, Default)]
pub struct InputNormalizer {
    layout: DeviceLayout,
    axis_levels: HashMap<(DeviceId, u32), f32>,
}

impl InputNormalizer {
    pub fn new(layout: DeviceLayout) -> Self {
        Self {
            layout,
            axis_levels: HashMap::new(),
        }
    }

    /// Returns the press this event represents, or None if it is not a press
    pub fn normalize(&mut self, event: &RawInputEvent) -> Option<InputPress> {
        match *event {
            RawInputEvent::Button {
                input,
                pressed: true,
                ..
            } => {
                let press = match self.layout.button(input) {
                    Some(button) => InputPress::Button(button),
                    None => InputPress::Unknown,
                };
                debug!("Raw button {} pressed -> {:?}", input, press);
                Some(press)
            }
            RawInputEvent::Button { pressed: false, .. } => None,
            RawInputEvent::Axis {
                device,
                axis,
                value,
            } => {
                let previous = self.axis_levels.insert((device, axis), value).unwrap_or(0.0);
                if previous <= 0.0 && value > 0.0 {
                    let press = match self.layout.axis(axis) {
                        Some(button) => InputPress::Button(button),
                        None => InputPress::Unknown,
                    };
                    debug!("Axis {} crossed to {:.3} -> {:?}", axis, value, press);
                    Some(press)
                } else {
                    trace!("Axis {} at {:.3}, no edge", axis, value);
                    None
                }
            }
        }
    }
}
