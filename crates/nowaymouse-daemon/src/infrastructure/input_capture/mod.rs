//! Keyboard capture for the daemon.
//!
//! On Linux the physical keyboard is opened through evdev and grabbed with
//! `EVIOCGRAB`, so no other reader (the compositor included) sees its events.
//! A dedicated thread performs the blocking reads and pushes key events into a
//! channel that the input router drains in order.
//!
//! # Testability
//!
//! The [`InputSource`] trait allows tests to inject synthetic events without
//! opening a device.

use std::path::PathBuf;
use std::sync::mpsc;

use nowaymouse_core::KeyCode;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// A key event read from the grabbed keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// evdev value 1.
    KeyDown { code: KeyCode },
    /// evdev value 0.
    KeyUp { code: KeyCode },
    /// evdev value 2, produced by kernel autorepeat while a key is held.
    KeyRepeat { code: KeyCode },
}

impl RawInputEvent {
    /// Builds an event from an `EV_KEY` code/value pair.  Returns `None` for
    /// values outside `0..=2`.
    pub fn from_evdev(code: KeyCode, value: i32) -> Option<Self> {
        match value {
            0 => Some(RawInputEvent::KeyUp { code }),
            1 => Some(RawInputEvent::KeyDown { code }),
            2 => Some(RawInputEvent::KeyRepeat { code }),
            _ => None,
        }
    }

    pub fn code(&self) -> KeyCode {
        match *self {
            RawInputEvent::KeyDown { code }
            | RawInputEvent::KeyUp { code }
            | RawInputEvent::KeyRepeat { code } => code,
        }
    }
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to open keyboard {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to grab keyboard {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("capture has already been started")]
    AlreadyStarted,
    #[error("failed to spawn capture thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// Trait abstracting keyboard event production.
///
/// The production implementation reads a grabbed evdev device; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts the source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;
    /// Stops the source.  The receiver disconnects once the reader exits.
    fn stop(&self);
}
