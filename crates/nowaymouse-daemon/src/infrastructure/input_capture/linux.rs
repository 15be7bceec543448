//! evdev keyboard capture.
//!
//! The device is opened and grabbed at construction so that permission and
//! "device busy" problems surface before anything else starts.  Before the
//! grab we wait briefly for every key to be released: a key that is down when
//! the grab happens (typically the Enter that launched the daemon) would
//! otherwise keep auto-repeating in the compositor forever.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use evdev::{Device, EventType, Key};
use tracing::{debug, info, warn};

use super::{CaptureError, InputSource, RawInputEvent};

/// Longest time to wait for held keys to be released before grabbing.
const RELEASE_WAIT: Duration = Duration::from_secs(2);
const RELEASE_POLL: Duration = Duration::from_millis(10);

/// Backoff bounds after a failed read.
const READ_BACKOFF_MIN: Duration = Duration::from_millis(10);
const READ_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// An exclusively grabbed evdev keyboard.
pub struct EvdevKeyboard {
    path: PathBuf,
    device: Mutex<Option<Device>>,
    running: Arc<AtomicBool>,
}

impl EvdevKeyboard {
    /// Opens `path` and grabs it.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Open`] if the node cannot be opened and
    /// [`CaptureError::Grab`] if another process already holds the grab.
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let mut device = Device::open(path).map_err(|source| CaptureError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        wait_for_release(&device);

        device.grab().map_err(|source| CaptureError::Grab {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            name = device.name().unwrap_or("<unnamed>"),
            "keyboard grabbed"
        );

        Ok(Self {
            path: path.to_path_buf(),
            device: Mutex::new(Some(device)),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InputSource for EvdevKeyboard {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let device = self
            .device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(CaptureError::AlreadyStarted)?;

        let (tx, rx) = mpsc::channel();
        let running = Arc::clone(&self.running);
        thread::Builder::new()
            .name("keyboard-reader".into())
            .spawn(move || read_loop(device, tx, running))
            .map_err(CaptureError::Thread)?;
        Ok(rx)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Reads events until the receiver is dropped or `running` is cleared.
///
/// Read errors are logged and retried with exponential backoff.  The grab is
/// released when `device` is dropped on exit.
fn read_loop(mut device: Device, tx: mpsc::Sender<RawInputEvent>, running: Arc<AtomicBool>) {
    let mut backoff = READ_BACKOFF_MIN;
    while running.load(Ordering::Relaxed) {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("keyboard read failed: {e}; retrying in {backoff:?}");
                thread::sleep(backoff);
                backoff = (backoff * 2).min(READ_BACKOFF_MAX);
                continue;
            }
        };
        backoff = READ_BACKOFF_MIN;

        for event in events {
            if event.event_type() != EventType::KEY {
                continue;
            }
            let Some(raw) = RawInputEvent::from_evdev(event.code(), event.value()) else {
                continue;
            };
            if tx.send(raw).is_err() {
                debug!("event receiver dropped; keyboard reader exiting");
                return;
            }
        }
    }
    debug!("keyboard reader stopped");
}

fn wait_for_release(device: &Device) {
    let deadline = Instant::now() + RELEASE_WAIT;
    loop {
        match device.get_key_state() {
            Ok(keys) if keys.iter().next().is_none() => return,
            Ok(_) if Instant::now() < deadline => thread::sleep(RELEASE_POLL),
            Ok(keys) => {
                let held: Vec<Key> = keys.iter().collect();
                warn!("keys still held after {RELEASE_WAIT:?}, grabbing anyway: {held:?}");
                return;
            }
            Err(e) => {
                warn!("could not read key state before grab: {e}");
                return;
            }
        }
    }
}

/// A keyboard-like device found under `/dev/input`.
#[derive(Debug, Clone)]
pub struct KeyboardInfo {
    pub path: PathBuf,
    pub name: String,
}

/// Lists devices that report both `KEY_A` and `KEY_SPACE`, sorted by path.
pub fn list_keyboards() -> Vec<KeyboardInfo> {
    let mut found: Vec<KeyboardInfo> = evdev::enumerate()
        .filter(|(_, device)| {
            device
                .supported_keys()
                .is_some_and(|keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_SPACE))
        })
        .map(|(path, device)| KeyboardInfo {
            path,
            name: device.name().unwrap_or("<unnamed>").to_string(),
        })
        .collect();
    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}
