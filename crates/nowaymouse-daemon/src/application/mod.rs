//! Application layer use cases for the daemon.
//!
//! Everything here depends on traits and `nowaymouse_core` domain types only.
//! No device handles, sockets, or files are touched directly; the
//! infrastructure layer supplies the implementations.
//!
//! # Sub-modules
//!
//! - **`route_input`** – The input router.  Consumes every key event from the
//!   grabbed keyboard, owns the mode state and the division navigator, and
//!   decides what each key does.
//!
//! - **`movement`** – The 16 ms movement engine that turns held motion keys
//!   into relative pointer and wheel events.
//!
//! - **`emulate_input`** – The virtual keyboard/mouse seam
//!   ([`emulate_input::PlatformInputEmulator`]) and the helpers built on it
//!   (absolute warps, clicks).
//!
//! - **`overlay_sync`** – Keeps the external overlay renderer in step with the
//!   current mode.

pub mod emulate_input;
pub mod movement;
pub mod overlay_sync;
pub mod route_input;
