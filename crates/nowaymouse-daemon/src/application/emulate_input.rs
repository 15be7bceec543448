//! Virtual keyboard and mouse output.
//!
//! [`PlatformInputEmulator`] is the seam to the OS: one method per primitive
//! event.  [`InputEmitter`] wraps it with the composite operations the router
//! and movement engine need, such as absolute warps built from relative moves
//! and clicks built from press/release pairs.

use std::sync::Arc;

use nowaymouse_core::{KeyCode, Motion, Point, WheelAxis};
use thiserror::Error;
use tracing::trace;

/// Extra distance past the screen edge used when homing the pointer.
const WARP_OVERSHOOT: i32 = 100;

/// Error type for input emulation operations.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("failed to create virtual device `{name}`: {reason}")]
    DeviceCreation { name: String, reason: String },
}

/// Buttons of the virtual mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Platform-agnostic input emulation trait.
///
/// The Linux implementation drives two uinput devices; tests use
/// [`crate::infrastructure::input_emulation::mock::MockInputEmulator`].
pub trait PlatformInputEmulator: Send + Sync {
    /// Presses `key` on the virtual keyboard.
    fn emit_key_down(&self, key: KeyCode) -> Result<(), EmulationError>;

    /// Releases `key` on the virtual keyboard.
    fn emit_key_up(&self, key: KeyCode) -> Result<(), EmulationError>;

    /// Moves the pointer by `(dx, dy)` pixels.
    fn emit_pointer_move(&self, dx: i32, dy: i32) -> Result<(), EmulationError>;

    /// Turns a scroll wheel by `amount` detents.
    fn emit_wheel(&self, axis: WheelAxis, amount: i32) -> Result<(), EmulationError>;

    /// Presses or releases a mouse button.
    fn emit_mouse_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError>;
}

/// Composite output operations over a [`PlatformInputEmulator`].
///
/// Cheap to clone; clones share the underlying devices.
#[derive(Clone)]
pub struct InputEmitter {
    emulator: Arc<dyn PlatformInputEmulator>,
    screen_width: u32,
    screen_height: u32,
}

impl InputEmitter {
    pub fn new(emulator: Arc<dyn PlatformInputEmulator>, screen_width: u32, screen_height: u32) -> Self {
        Self {
            emulator,
            screen_width,
            screen_height,
        }
    }

    /// Forwards a key edge to the virtual keyboard.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if the device write fails.
    pub fn key(&self, key: KeyCode, pressed: bool) -> Result<(), EmulationError> {
        if pressed {
            self.emulator.emit_key_down(key)
        } else {
            self.emulator.emit_key_up(key)
        }
    }

    /// Emits one relative pointer or wheel motion.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if the device write fails.
    pub fn apply(&self, motion: Motion) -> Result<(), EmulationError> {
        match motion {
            Motion::Pointer { dx, dy } => self.emulator.emit_pointer_move(dx, dy),
            Motion::Wheel { axis, amount } => self.emulator.emit_wheel(axis, amount),
        }
    }

    /// Presses or releases `button`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if the device write fails.
    pub fn button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError> {
        self.emulator.emit_mouse_button(button, pressed)
    }

    /// Presses and then releases `button`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if either device write fails.
    pub fn click(&self, button: MouseButton) -> Result<(), EmulationError> {
        self.emulator.emit_mouse_button(button, true)?;
        self.emulator.emit_mouse_button(button, false)
    }

    /// Places the pointer at an absolute screen position.
    ///
    /// A relative-only mouse cannot jump, so the pointer is first driven past
    /// the top-left corner, where the compositor clamps it to `(0, 0)`, and
    /// then moved by the target offset.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if either device write fails.
    pub fn warp_to(&self, target: Point) -> Result<(), EmulationError> {
        let (x, y) = target.to_pixels();
        trace!(x, y, "warping pointer");
        self.emulator.emit_pointer_move(
            -(self.screen_width as i32) - WARP_OVERSHOOT,
            -(self.screen_height as i32) - WARP_OVERSHOOT,
        )?;
        self.emulator.emit_pointer_move(x, y)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
