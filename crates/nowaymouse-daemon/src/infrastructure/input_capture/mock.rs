//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without opening an
//! evdev device.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use super::{CaptureError, InputSource, RawInputEvent};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<RawInputEvent>>>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Injects a synthetic event, as if read from the keyboard.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_event(&self, event: RawInputEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(event)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockInputSource::inject_event called before start()");
        }
    }

    /// Injects a press and a release of `code`.
    pub fn tap(&self, code: u16) {
        self.inject_event(RawInputEvent::KeyDown { code });
        self.inject_event(RawInputEvent::KeyUp { code });
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_input_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(RawInputEvent::KeyDown { code: 30 });

        // Assert
        assert_eq!(rx.recv().unwrap(), RawInputEvent::KeyDown { code: 30 });
    }

    #[test]
    fn test_mock_input_source_stop_closes_channel() {
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        source.stop();

        assert!(rx.recv().is_err(), "channel should be closed after stop()");
    }

    #[test]
    fn test_tap_injects_press_then_release() {
        let source = MockInputSource::new();
        let rx = source.start().unwrap();

        source.tap(57);

        assert_eq!(rx.recv().unwrap(), RawInputEvent::KeyDown { code: 57 });
        assert_eq!(rx.recv().unwrap(), RawInputEvent::KeyUp { code: 57 });
    }

    #[test]
    fn test_from_evdev_maps_values() {
        assert_eq!(RawInputEvent::from_evdev(1, 0), Some(RawInputEvent::KeyUp { code: 1 }));
        assert_eq!(RawInputEvent::from_evdev(1, 1), Some(RawInputEvent::KeyDown { code: 1 }));
        assert_eq!(RawInputEvent::from_evdev(1, 2), Some(RawInputEvent::KeyRepeat { code: 1 }));
        assert_eq!(RawInputEvent::from_evdev(1, 3), None);
        assert_eq!(RawInputEvent::KeyRepeat { code: 9 }.code(), 9);
    }
}
