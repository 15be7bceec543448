//! Domain entities for nowaymouse.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: no device handles, no sockets, no file system access.
//!
//! - **`config`** – The on-disk configuration schema and its validation into
//!   the immutable [`config::Settings`] the daemon runs with.
//! - **`division`** – The recursive grid-descent navigator.
//! - **`mode`** – The interaction mode enum.
//! - **`motion`** – Movement/scroll key identities and the held-key flags.

pub mod config;
pub mod division;
pub mod mode;
pub mod motion;
