//! # nowaymouse-core
//!
//! Shared library for nowaymouse containing the division grid navigator, the
//! held-key motion model, the configuration schema and its validation, the
//! overlay text protocol, and the evdev key-name table.
//!
//! This crate has zero dependencies on OS APIs, input devices, or sockets.
//! Everything here can be compiled and tested on any machine.
//!
//! # Architecture overview
//!
//! nowaymouse grabs a physical keyboard and turns it into a pointing device.
//! Ordinary keystrokes are relayed to a virtual keyboard; two special modes
//! drive a virtual mouse instead:
//!
//! - **MouseMove** – held keys move the pointer or scroll continuously.
//! - **Division** – the screen is split into a labelled grid; typing a label
//!   narrows the grid recursively until the pointer lands on the chosen cell.
//!
//! This crate defines:
//!
//! - **`domain`** – Pure state: the validated [`Settings`], the
//!   [`DivisionNavigator`] state machine and the [`HeldKeySet`].
//!
//! - **`protocol`** – The `show`/`hide` line format understood by the overlay
//!   renderer.
//!
//! - **`keymap`** – Translation between Linux evdev key codes and the key names
//!   used in configuration files and division labels.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::config::{AppConfig, ConfigError, Settings};
pub use domain::division::{DivisionGrid, DivisionNavigator, GridView, Point, Step};
pub use domain::mode::Mode;
pub use domain::motion::{HeldKeySet, Motion, MotionKey, WheelAxis};
pub use keymap::KeyCode;
pub use protocol::overlay::{OverlayCommand, ProtocolError};
