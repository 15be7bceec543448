//! RouteInputUseCase: decides what every key from the grabbed keyboard does.
//!
//! This use case is the heart of the daemon.  It is the only writer of the
//! [`Mode`], the only driver of the [`DivisionNavigator`], and the only writer
//! of the held-key flags the movement engine reads.
//!
//! # Event handling order
//!
//! For each event:
//!
//! 1. A press of the activation key toggles between Idle and MouseMove (or
//!    aborts a division).  Its releases and repeats are swallowed.
//! 2. A release of a key that was passed through while Idle is passed through
//!    as well, whatever the current mode.
//! 3. Otherwise the event is handled by the current mode:
//!
//! | Mode      | Behaviour                                                  |
//! |-----------|------------------------------------------------------------|
//! | Idle      | press/release forwarded to the virtual keyboard            |
//! | MouseMove | motion keys set/clear held flags, click keys drive buttons |
//! | Division  | key presses are fed to the navigator as label text         |
//!
//! Handling never blocks or awaits; each event is processed to completion
//! before the next is read.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, PoisonError};
use std::time::Duration;

use nowaymouse_core::domain::config::{Behavior, Keybinds};
use nowaymouse_core::{
    keymap, DivisionNavigator, KeyCode, Mode, OverlayCommand, Point, Settings, Step,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::emulate_input::{EmulationError, InputEmitter, MouseButton};
use super::movement::SharedHeldKeys;
use super::overlay_sync::OverlayChannel;
use crate::infrastructure::input_capture::RawInputEvent;

/// How often the event loop checks the shutdown flag while idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Error type for the route-input use case.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("virtual device error: {0}")]
    Emulation(#[from] EmulationError),
}

/// Mouse buttons the daemon currently holds down on the virtual mouse.
#[derive(Debug, Default, Clone, Copy)]
struct ButtonState {
    left: bool,
    right: bool,
}

impl ButtonState {
    fn slot(&mut self, button: MouseButton) -> &mut bool {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
        }
    }
}

/// All mutable routing state, owned by the router.
pub struct Session {
    mode: Mode,
    navigator: DivisionNavigator,
    held: SharedHeldKeys,
    buttons: ButtonState,
    /// Keys pressed on the virtual keyboard and not yet released.
    passed_through: HashSet<KeyCode>,
}

impl Session {
    pub fn new(navigator: DivisionNavigator, held: SharedHeldKeys) -> Self {
        Self {
            mode: Mode::Idle,
            navigator,
            held,
            buttons: ButtonState::default(),
            passed_through: HashSet::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn navigator(&self) -> &DivisionNavigator {
        &self.navigator
    }
}

/// The Route Input use case.
pub struct RouteInputUseCase {
    keys: Keybinds,
    behavior: Behavior,
    session: Session,
    output: InputEmitter,
    overlay: OverlayChannel,
}

impl RouteInputUseCase {
    pub fn new(
        settings: &Settings,
        held: SharedHeldKeys,
        output: InputEmitter,
        overlay: OverlayChannel,
    ) -> Self {
        Self {
            keys: settings.keybinds.clone(),
            behavior: settings.behavior,
            session: Session::new(DivisionNavigator::new(settings.division.clone()), held),
            output,
            overlay,
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn overlay(&self) -> &OverlayChannel {
        &self.overlay
    }

    /// Drains `events` until the sender disconnects or `running` is cleared.
    ///
    /// Errors from individual events are logged; the loop keeps going.
    pub fn run(mut self, events: mpsc::Receiver<RawInputEvent>, running: Arc<AtomicBool>) {
        info!("input router started");
        while running.load(Ordering::Relaxed) {
            let event = match events.recv_timeout(SHUTDOWN_POLL) {
                Ok(event) => event,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("keyboard event stream closed");
                    break;
                }
            };
            if let Err(e) = self.handle_event(event) {
                warn!(?event, "failed to handle key event: {e}");
            }
        }
        self.release_all();
        info!("input router stopped");
    }

    /// Handles one key event.
    ///
    /// The mode is updated before any output is written, so a failed write
    /// never leaves the router in a half-transitioned state.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Emulation`] if writing to a virtual device fails.
    pub fn handle_event(&mut self, event: RawInputEvent) -> Result<(), RouteError> {
        if self.session.mode.may_show_overlay() {
            self.overlay.resync();
        }

        let code = event.code();
        if code == self.keys.activation {
            if let RawInputEvent::KeyDown { .. } = event {
                self.toggle_activation()?;
            }
            return Ok(());
        }

        if let RawInputEvent::KeyUp { code } = event {
            if self.session.mode != Mode::Idle && self.session.passed_through.remove(&code) {
                debug!(code, mode = %self.session.mode, "releasing key pressed while idle");
                self.output.key(code, false)?;
                return Ok(());
            }
        }

        match self.session.mode {
            Mode::Idle => self.handle_idle(event),
            Mode::MouseMove => self.handle_mouse_move(event),
            Mode::Division => self.handle_division(event),
        }
    }

    // ── Mode transitions ──────────────────────────────────────────────────────

    fn toggle_activation(&mut self) -> Result<(), RouteError> {
        match self.session.mode {
            Mode::Idle => {
                self.set_mode(Mode::MouseMove);
                Ok(())
            }
            Mode::MouseMove => {
                self.set_mode(Mode::Idle);
                self.overlay.hide();
                self.leave_mouse_move()
            }
            Mode::Division => {
                self.session.navigator.reset();
                self.set_mode(Mode::Idle);
                self.overlay.hide();
                Ok(())
            }
        }
    }

    fn enter_division(&mut self) {
        let view = self.session.navigator.enter();
        self.set_mode(Mode::Division);
        self.overlay.show(view);
    }

    /// Mode to return to when a division finishes or is abandoned.
    fn after_division(&self) -> Mode {
        if self.behavior.return_to_move_mode {
            Mode::MouseMove
        } else {
            Mode::Idle
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.session.mode != mode {
            info!(from = %self.session.mode, to = %mode, "mode changed");
            self.session.mode = mode;
        }
    }

    /// Clears every held flag and releases buttons held on the virtual mouse.
    fn leave_mouse_move(&mut self) -> Result<(), RouteError> {
        self.session
            .held
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let mut result = Ok(());
        for button in [MouseButton::Left, MouseButton::Right] {
            let slot = self.session.buttons.slot(button);
            if *slot {
                *slot = false;
                if let Err(e) = self.output.button(button, false) {
                    result = Err(e.into());
                }
            }
        }
        result
    }

    /// Releases everything the daemon holds down.  Used at shutdown.
    fn release_all(&mut self) {
        if let Err(e) = self.leave_mouse_move() {
            warn!("failed to release mouse buttons: {e}");
        }
        for code in std::mem::take(&mut self.session.passed_through) {
            if let Err(e) = self.output.key(code, false) {
                warn!(code, "failed to release key: {e}");
            }
        }
        if self.overlay.desired() != OverlayCommand::Hide {
            self.overlay.hide();
        }
    }

    // ── Per-mode handlers ─────────────────────────────────────────────────────

    fn handle_idle(&mut self, event: RawInputEvent) -> Result<(), RouteError> {
        match event {
            RawInputEvent::KeyDown { code }
                if code == self.keys.division && self.behavior.division_from_idle =>
            {
                self.enter_division();
                Ok(())
            }
            RawInputEvent::KeyDown { code } => {
                self.session.passed_through.insert(code);
                Ok(self.output.key(code, true)?)
            }
            RawInputEvent::KeyUp { code } => {
                self.session.passed_through.remove(&code);
                Ok(self.output.key(code, false)?)
            }
            RawInputEvent::KeyRepeat { .. } => Ok(()),
        }
    }

    fn handle_mouse_move(&mut self, event: RawInputEvent) -> Result<(), RouteError> {
        let (code, pressed) = match event {
            RawInputEvent::KeyDown { code } => (code, true),
            RawInputEvent::KeyUp { code } => (code, false),
            RawInputEvent::KeyRepeat { .. } => return Ok(()),
        };

        if let Some(key) = self.keys.motion_key(code) {
            let changed = self
                .session
                .held
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .set(key, pressed);
            if changed {
                debug!(?key, pressed, "motion key");
            }
            return Ok(());
        }

        let button = if code == self.keys.left_click {
            Some(MouseButton::Left)
        } else if code == self.keys.right_click {
            Some(MouseButton::Right)
        } else {
            None
        };
        if let Some(button) = button {
            let slot = self.session.buttons.slot(button);
            if *slot != pressed {
                *slot = pressed;
                self.output.button(button, pressed)?;
            }
            return Ok(());
        }

        if pressed && code == self.keys.division {
            let released = self.leave_mouse_move();
            self.enter_division();
            return released;
        }

        debug!(code, "key ignored in mouse-move mode");
        Ok(())
    }

    fn handle_division(&mut self, event: RawInputEvent) -> Result<(), RouteError> {
        let RawInputEvent::KeyDown { code } = event else {
            return Ok(());
        };
        let Some(label) = keymap::code_to_name(code) else {
            debug!(code, "unnamed key ignored in division mode");
            return Ok(());
        };

        match self.session.navigator.press(label) {
            Step::Pending | Step::Ignored => Ok(()),
            Step::Descend { target, next } => {
                let warped = self.output.warp_to(target);
                self.overlay.show(next);
                Ok(warped?)
            }
            Step::Selected { target } => self.finish_division(target),
            Step::Aborted => {
                info!("division aborted");
                self.set_mode(self.after_division());
                self.overlay.hide();
                Ok(())
            }
        }
    }

    fn finish_division(&mut self, target: Point) -> Result<(), RouteError> {
        let (x, y) = target.to_pixels();
        info!(x, y, "division selected");
        self.set_mode(self.after_division());
        let warped = self.output.warp_to(target);
        self.overlay.hide();
        warped?;
        if self.behavior.click_after_select {
            self.output.click(MouseButton::Left)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
