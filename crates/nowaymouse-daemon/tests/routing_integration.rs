//! End-to-end routing through the public daemon API.
//!
//! A [`MockInputSource`] feeds the router thread exactly as the evdev reader
//! would; the movement engine is ticked by hand so assertions are exact.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use nowaymouse_core::domain::config::LevelConfig;
use nowaymouse_core::{AppConfig, Settings};
use nowaymouse_daemon::application::emulate_input::{
    InputEmitter, MouseButton, PlatformInputEmulator,
};
use nowaymouse_daemon::application::movement::{shared_held_keys, MovementEngine};
use nowaymouse_daemon::application::overlay_sync::{OverlayChannel, OverlayNotifier};
use nowaymouse_daemon::application::route_input::RouteInputUseCase;
use nowaymouse_daemon::infrastructure::input_capture::mock::MockInputSource;
use nowaymouse_daemon::infrastructure::input_capture::{InputSource, RawInputEvent};
use nowaymouse_daemon::infrastructure::input_emulation::mock::{EmittedEvent, MockInputEmulator};
use nowaymouse_daemon::infrastructure::overlay::mock::RecordingOverlay;

const CAPSLOCK: u16 = 58;
const F: u16 = 33;
const D: u16 = 32;
const B: u16 = 48;
const Y: u16 = 21;
const H: u16 = 35;

struct Daemon {
    source: MockInputSource,
    emulator: Arc<MockInputEmulator>,
    overlay: Arc<RecordingOverlay>,
    engine: MovementEngine,
    running: Arc<AtomicBool>,
    router: Option<thread::JoinHandle<()>>,
}

impl Daemon {
    fn start(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::default();
        cfg.screen.width = 1000;
        cfg.screen.height = 800;
        configure(&mut cfg);
        let settings = Settings::from_config(&cfg).expect("valid config");

        let emulator = Arc::new(MockInputEmulator::new());
        let output = InputEmitter::new(
            Arc::clone(&emulator) as Arc<dyn PlatformInputEmulator>,
            settings.screen_width,
            settings.screen_height,
        );
        let overlay = Arc::new(RecordingOverlay::new());
        let held = shared_held_keys();
        let engine = MovementEngine::new(
            Arc::clone(&held),
            output.clone(),
            settings.mouse_speed,
            settings.scroll_speed,
        );
        let router = RouteInputUseCase::new(
            &settings,
            held,
            output,
            OverlayChannel::new(Arc::clone(&overlay) as Arc<dyn OverlayNotifier>),
        );

        let source = MockInputSource::new();
        let events = source.start().expect("mock source starts");
        let running = Arc::new(AtomicBool::new(true));
        let router_running = Arc::clone(&running);
        let router = thread::spawn(move || router.run(events, router_running));

        Self {
            source,
            emulator,
            overlay,
            engine,
            running,
            router: Some(router),
        }
    }

    fn press(&self, code: u16) {
        self.source.inject_event(RawInputEvent::KeyDown { code });
    }

    fn tap(&self, code: u16) {
        self.source.tap(code);
    }

    /// Waits until the router has produced at least `count` events.
    fn wait_for_events(&self, count: usize) -> Vec<EmittedEvent> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let events = self.emulator.events();
            if events.len() >= count || Instant::now() > deadline {
                return events;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Waits until the router has delivered at least `count` overlay lines.
    fn wait_for_lines(&self, count: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let lines = self.overlay.lines();
            if lines.len() >= count || Instant::now() > deadline {
                return lines;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Closes the event stream and joins the router thread.
    fn stop(&mut self) {
        self.source.stop();
        if let Some(router) = self.router.take() {
            router.join().expect("router thread");
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.stop();
    }
}

fn two_levels(cfg: &mut AppConfig) {
    cfg.division.levels = vec![
        LevelConfig {
            cols: 2,
            rows: 1,
            labels: vec!["A".into(), "B".into()],
        },
        LevelConfig {
            cols: 1,
            rows: 2,
            labels: vec!["X".into(), "Y".into()],
        },
    ];
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_typing_passes_through_in_order() {
    // Arrange
    let mut daemon = Daemon::start(|_| {});

    // Act
    daemon.tap(H);
    daemon.tap(D);
    let events = daemon.wait_for_events(4);
    daemon.stop();

    // Assert
    assert_eq!(
        events,
        vec![
            EmittedEvent::KeyDown(H),
            EmittedEvent::KeyUp(H),
            EmittedEvent::KeyDown(D),
            EmittedEvent::KeyUp(D),
        ]
    );
}

#[test]
fn test_motion_is_emitted_while_key_is_held() {
    // Arrange: D is mouse_right by default
    let mut daemon = Daemon::start(|cfg| cfg.motion.mouse_speed = 4);
    daemon.tap(CAPSLOCK);
    daemon.press(D);
    let deadline = Instant::now() + Duration::from_secs(2);
    while daemon.engine.tick() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    daemon.emulator.clear();

    // Act
    daemon.engine.tick();
    daemon.engine.tick();

    // Assert
    assert_eq!(daemon.emulator.moves(), vec![(4, 0), (4, 0)]);
    daemon.stop();
}

#[test]
fn test_toggling_off_stops_motion() {
    // Arrange
    let mut daemon = Daemon::start(|_| {});
    daemon.tap(CAPSLOCK);
    daemon.press(D);

    // Act
    daemon.tap(CAPSLOCK);
    daemon.stop();

    // Assert
    assert_eq!(daemon.engine.tick(), 0);
    assert!(daemon.emulator.moves().is_empty());
    assert_eq!(daemon.overlay.lines(), vec!["hide"]);
}

#[test]
fn test_two_level_division_lands_on_final_cell_and_clicks() {
    // Arrange
    let mut daemon = Daemon::start(|cfg| {
        two_levels(cfg);
        cfg.behavior.click_after_select = true;
    });
    daemon.tap(CAPSLOCK);

    // Act
    daemon.tap(F);
    daemon.press(B);
    daemon.press(Y);
    let lines = daemon.wait_for_lines(3);
    daemon.stop();

    // Assert
    assert_eq!(
        lines,
        vec!["show,0,0,0,1000,800,2,1", "show,1,500,0,500,800,1,2", "hide"]
    );
    assert_eq!(daemon.emulator.moves().last(), Some(&(750, 600)));
    let events = daemon.emulator.events();
    assert_eq!(
        &events[events.len() - 2..],
        &[
            EmittedEvent::Button { button: MouseButton::Left, pressed: true },
            EmittedEvent::Button { button: MouseButton::Left, pressed: false },
        ]
    );
}

#[test]
fn test_router_releases_pass_through_keys_when_stream_closes() {
    let mut daemon = Daemon::start(|_| {});

    daemon.press(H);
    daemon.wait_for_events(1);
    daemon.stop();

    assert_eq!(
        daemon.emulator.events(),
        vec![EmittedEvent::KeyDown(H), EmittedEvent::KeyUp(H)]
    );
}
