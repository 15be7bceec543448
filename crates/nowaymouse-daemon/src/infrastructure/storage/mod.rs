//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module locates the TOML file, reads it, and falls back to
//! built-in defaults when no file exists yet.  Validation of the parsed values
//! lives in `nowaymouse_core::Settings`; this layer only deals with paths,
//! file IO and TOML syntax.

pub mod config;
