//! Recording overlay notifier for unit testing.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::overlay_sync::{OverlayError, OverlayNotifier};

/// Records every successfully delivered line and counts every attempt.
///
/// While failing, sends return [`OverlayError::Connect`] and nothing is
/// recorded, as if the renderer were not listening.
#[derive(Default)]
pub struct RecordingOverlay {
    lines: Mutex<Vec<String>>,
    should_fail: AtomicBool,
    attempts: AtomicUsize,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.lock().unwrap().last().cloned()
    }

    /// Number of sends, failed or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl OverlayNotifier for RecordingOverlay {
    fn send(&self, line: &str) -> Result<(), OverlayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(OverlayError::Connect {
                path: PathBuf::from("/nonexistent/overlay.sock"),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}
