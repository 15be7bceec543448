//! Mock platform input emulator for unit testing.
//!
//! Every emitted event is appended to a single ordered log so tests can assert
//! on interleavings (a key-up after a warp, a click after a hide, ...), not
//! just on per-kind counts.
//!
//! ```ignore
//! let emulator = Arc::new(MockInputEmulator::new());
//! let emitter = InputEmitter::new(Arc::clone(&emulator), 1920, 1080);
//!
//! emitter.click(MouseButton::Left).unwrap();
//!
//! assert_eq!(emulator.events().len(), 2);
//! ```
//!
//! Call [`MockInputEmulator::set_failing`] to make every method return
//! [`EmulationError::Platform`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use nowaymouse_core::{KeyCode, WheelAxis};

use crate::application::emulate_input::{EmulationError, MouseButton, PlatformInputEmulator};

/// One recorded output event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmittedEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Move { dx: i32, dy: i32 },
    Wheel { axis: WheelAxis, amount: i32 },
    Button { button: MouseButton, pressed: bool },
}

/// A mock emulator that records all calls without touching any device.
#[derive(Default)]
pub struct MockInputEmulator {
    events: Mutex<Vec<EmittedEvent>>,
    should_fail: AtomicBool,
}

impl MockInputEmulator {
    /// Creates a mock with an empty log that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that fails on every call.
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.set_failing(true);
        mock
    }

    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of every event recorded so far, in emission order.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns only the pointer moves, in emission order.
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EmittedEvent::Move { dx, dy } => Some((dx, dy)),
                _ => None,
            })
            .collect()
    }

    /// Discards the recorded log.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: EmittedEvent) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl PlatformInputEmulator for MockInputEmulator {
    fn emit_key_down(&self, key: KeyCode) -> Result<(), EmulationError> {
        self.record(EmittedEvent::KeyDown(key))
    }

    fn emit_key_up(&self, key: KeyCode) -> Result<(), EmulationError> {
        self.record(EmittedEvent::KeyUp(key))
    }

    fn emit_pointer_move(&self, dx: i32, dy: i32) -> Result<(), EmulationError> {
        self.record(EmittedEvent::Move { dx, dy })
    }

    fn emit_wheel(&self, axis: WheelAxis, amount: i32) -> Result<(), EmulationError> {
        self.record(EmittedEvent::Wheel { axis, amount })
    }

    fn emit_mouse_button(&self, button: MouseButton, pressed: bool) -> Result<(), EmulationError> {
        self.record(EmittedEvent::Button { button, pressed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_in_order() {
        // Arrange
        let mock = MockInputEmulator::new();

        // Act
        mock.emit_key_down(1).unwrap();
        mock.emit_pointer_move(3, 4).unwrap();
        mock.emit_key_up(1).unwrap();

        // Assert
        assert_eq!(
            mock.events(),
            vec![
                EmittedEvent::KeyDown(1),
                EmittedEvent::Move { dx: 3, dy: 4 },
                EmittedEvent::KeyUp(1),
            ]
        );
        assert_eq!(mock.moves(), vec![(3, 4)]);
    }

    #[test]
    fn test_failing_mock_records_nothing() {
        let mock = MockInputEmulator::failing();

        assert!(mock.emit_wheel(WheelAxis::Vertical, 1).is_err());
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_clear_discards_log() {
        let mock = MockInputEmulator::new();
        mock.emit_key_down(2).unwrap();

        mock.clear();

        assert!(mock.events().is_empty());
    }
}
