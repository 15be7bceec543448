//! Virtual input device implementations.
//!
//! The uinput implementation is compiled on Linux only; the recording mock is
//! always available.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;
