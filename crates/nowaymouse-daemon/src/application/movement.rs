//! Continuous movement engine.
//!
//! Every [`TICK_INTERVAL`] the engine read-locks the shared [`HeldKeySet`]
//! and emits one fixed-size relative motion for each held key.  The router is
//! the only writer of the set; it takes the write lock for a single flag flip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use nowaymouse_core::HeldKeySet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use super::emulate_input::InputEmitter;

/// Period of the movement loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Held-key flags shared between the router (writer) and the engine (reader).
pub type SharedHeldKeys = Arc<RwLock<HeldKeySet>>;

/// Creates an empty shared key set.
pub fn shared_held_keys() -> SharedHeldKeys {
    Arc::new(RwLock::new(HeldKeySet::new()))
}

pub struct MovementEngine {
    held: SharedHeldKeys,
    output: InputEmitter,
    mouse_speed: i32,
    scroll_speed: i32,
}

impl MovementEngine {
    pub fn new(held: SharedHeldKeys, output: InputEmitter, mouse_speed: i32, scroll_speed: i32) -> Self {
        Self {
            held,
            output,
            mouse_speed,
            scroll_speed,
        }
    }

    /// Runs one tick.  Returns the number of motions emitted.
    ///
    /// The read lock is held for the whole tick so a tick never observes a
    /// half-applied router update.  Emission failures are logged and the
    /// remaining keys are still processed.
    pub fn tick(&self) -> usize {
        let held = self.held.read().unwrap_or_else(PoisonError::into_inner);
        let mut emitted = 0;
        for key in held.held() {
            match self.output.apply(key.motion(self.mouse_speed, self.scroll_speed)) {
                Ok(()) => emitted += 1,
                Err(e) => warn!(?key, "movement emit failed: {e}"),
            }
        }
        if emitted > 0 {
            trace!(emitted, "movement tick");
        }
        emitted
    }

    /// Ticks every [`TICK_INTERVAL`] until `running` is cleared.
    pub async fn run(self, running: Arc<AtomicBool>) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("movement engine started");
        while running.load(Ordering::Relaxed) {
            interval.tick().await;
            self.tick();
        }
        debug!("movement engine stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
