//! Infrastructure layer for the daemon.
//!
//! Contains OS-facing adapters: the evdev keyboard grab, the uinput virtual
//! devices, the overlay socket and renderer process, and config file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `nowaymouse_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.

pub mod input_capture;
pub mod input_emulation;
pub mod overlay;
pub mod storage;
