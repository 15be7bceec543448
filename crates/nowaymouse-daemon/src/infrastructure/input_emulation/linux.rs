//! Linux input emulation via uinput.
//!
//! Two virtual devices are created at startup:
//!
//! | Device                | Capabilities                                   |
//! |-----------------------|------------------------------------------------|
//! | `nowaymouse-keyboard` | every keyboard key code (1–255)                |
//! | `nowaymouse-mouse`    | `BTN_LEFT/RIGHT/MIDDLE`, `REL_X/Y/WHEEL/HWHEEL` |
//!
//! Keeping the keyboard and mouse separate lets libinput classify each device
//! correctly; a combined device is sometimes treated as a keyboard only.
//!
//! `VirtualDevice::emit` appends the `SYN_REPORT` itself, so each call below
//! writes one complete input frame.
//!
//! # Permissions
//!
//! Creating uinput devices requires write access to `/dev/uinput`, which
//! normally means running as root or being in the `input` group with a
//! matching udev rule.

use std::io;
use std::sync::{Mutex, PoisonError};

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use nowaymouse_core::{KeyCode, WheelAxis};
use tracing::info;

use crate::application::emulate_input::{EmulationError, MouseButton, PlatformInputEmulator};

pub const KEYBOARD_DEVICE_NAME: &str = "nowaymouse-keyboard";
pub const MOUSE_DEVICE_NAME: &str = "nowaymouse-mouse";

/// Highest code below the `BTN_*` range.
const MAX_KEYBOARD_CODE: KeyCode = 0xff;

/// uinput-backed emulator owning the virtual keyboard and mouse.
pub struct UinputEmulator {
    keyboard: Mutex<VirtualDevice>,
    mouse: Mutex<VirtualDevice>,
}

impl UinputEmulator {
    /// Creates both virtual devices.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError::DeviceCreation`] naming the device that could
    /// not be created.
    pub fn new() -> Result<Self, EmulationError> {
        let keyboard = build_keyboard().map_err(|e| creation_error(KEYBOARD_DEVICE_NAME, e))?;
        let mouse = build_mouse().map_err(|e| creation_error(MOUSE_DEVICE_NAME, e))?;
        info!("created virtual devices {KEYBOARD_DEVICE_NAME} and {MOUSE_DEVICE_NAME}");
        Ok(Self {
            keyboard: Mutex::new(keyboard),
            mouse: Mutex::new(mouse),
        })
    }

    fn emit(device: &Mutex<VirtualDevice>, events: &[InputEvent]) -> Result<(), EmulationError> {
        if events.is_empty() {
            return Ok(());
        }
        device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(events)
            .map_err(|e| EmulationError::Platform(e.to_string()))
    }
}

impl PlatformInputEmulator for UinputEmulator {
    fn emit_key_down(&self, key: KeyCode) -> Result<(), EmulationError> {
        Self::emit(&self.keyboard, &[InputEvent::new(EventType::KEY, key, 1)])
    }

    fn emit_key_up(&self, key: KeyCode) -> Result<(), EmulationError> {
        Self::emit(&self.keyboard, &[InputEvent::new(EventType::KEY, key, 0)])
    }

    fn emit_pointer_move(&self, dx: i32, dy: i32) -> Result<(), EmulationError> {
        let mut events = Vec::with_capacity(2);
        if dx != 0 {
            events.push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx));
        }
        if dy != 0 {
            events.push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy));
        }
        Self::emit(&self.mouse, &events)
    }

    fn emit_wheel(&self, axis: WheelAxis, amount: i32) -> Result<(), EmulationError> {
        if amount == 0 {
            return Ok(());
        }
        let code = match axis {
            WheelAxis::Vertical => RelativeAxisType::REL_WHEEL.0,
            WheelAxis::Horizontal => RelativeAxisType::REL_HWHEEL.0,
        };
        Self::emit(&self.mouse, &[InputEvent::new(EventType::RELATIVE, code, amount)])
    }

    fn emit_mouse_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError> {
        let code = match button {
            MouseButton::Left => Key::BTN_LEFT.code(),
            MouseButton::Right => Key::BTN_RIGHT.code(),
        };
        Self::emit(
            &self.mouse,
            &[InputEvent::new(EventType::KEY, code, i32::from(pressed))],
        )
    }
}

fn build_keyboard() -> io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    for code in 1..=MAX_KEYBOARD_CODE {
        keys.insert(Key::new(code));
    }
    VirtualDeviceBuilder::new()?
        .name(KEYBOARD_DEVICE_NAME)
        .with_keys(&keys)?
        .build()
}

fn build_mouse() -> io::Result<VirtualDevice> {
    let mut buttons = AttributeSet::<Key>::new();
    buttons.insert(Key::BTN_LEFT);
    buttons.insert(Key::BTN_RIGHT);
    buttons.insert(Key::BTN_MIDDLE);

    let mut axes = AttributeSet::<RelativeAxisType>::new();
    axes.insert(RelativeAxisType::REL_X);
    axes.insert(RelativeAxisType::REL_Y);
    axes.insert(RelativeAxisType::REL_WHEEL);
    axes.insert(RelativeAxisType::REL_HWHEEL);

    VirtualDeviceBuilder::new()?
        .name(MOUSE_DEVICE_NAME)
        .with_keys(&buttons)?
        .with_relative_axes(&axes)?
        .build()
}

fn creation_error(name: &str, err: io::Error) -> EmulationError {
    EmulationError::DeviceCreation {
        name: name.to_string(),
        reason: err.to_string(),
    }
}
