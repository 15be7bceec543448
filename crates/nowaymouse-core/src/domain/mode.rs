//! The interaction mode of the daemon.

use std::fmt;

/// Which interaction mode is active. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Keystrokes pass through to the virtual keyboard.
    #[default]
    Idle,
    /// Held keys drive the pointer and the scroll wheels.
    MouseMove,
    /// A division grid is being navigated.
    Division,
}

impl Mode {
    /// Returns `true` for modes in which the overlay may be on screen.
    pub fn may_show_overlay(self) -> bool {
        matches!(self, Mode::MouseMove | Mode::Division)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::MouseMove => "mouse-move",
            Mode::Division => "division",
        };
        f.write_str(name)
    }
}
