//! TOML configuration loading for the daemon.
//!
//! The default file is `nowaymouse/config.toml` under the user's config
//! directory:
//!
//! - `$XDG_CONFIG_HOME/nowaymouse/config.toml`, or
//! - `$HOME/.config/nowaymouse/config.toml`.
//!
//! The daemon normally runs as root through `sudo`, where `$HOME` is `/root`.
//! In that case the invoking user's directory (`/home/$SUDO_USER/.config`) is
//! used instead, so the file they edit is the file that is read.
//!
//! ```toml
//! keyboard_input_path = "/dev/input/event3"
//!
//! [keybinds]
//! activation = "CAPSLOCK"
//!
//! [[division.levels]]
//! cols = 2
//! rows = 1
//! labels = ["A", "B"]
//! ```
//!
//! Every section and field is optional; absent values take the defaults
//! defined on [`AppConfig`].
//!
//! Loading runs before the log subscriber exists, so nothing here logs.  The
//! returned [`LoadedConfig`] says where the values came from and the caller
//! reports it once logging is up.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use nowaymouse_core::AppConfig;
use thiserror::Error;

const APP_DIR: &str = "nowaymouse";
const FILE_NAME: &str = "config.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Neither `$XDG_CONFIG_HOME`, `$HOME` nor `$SUDO_USER` is set.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file.
    File(PathBuf),
    /// No file at this default location; built-in defaults are used.
    Defaults(PathBuf),
}

/// A configuration together with its origin.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: ConfigSource,
}

/// Environment values that decide where the config directory is.
#[derive(Debug, Clone, Default)]
struct ConfigEnv {
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
    sudo_user: Option<OsString>,
}

impl ConfigEnv {
    fn from_process() -> Self {
        Self {
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME"),
            home: std::env::var_os("HOME"),
            sudo_user: std::env::var_os("SUDO_USER"),
        }
    }

    fn config_base(&self) -> Option<PathBuf> {
        let non_empty = |v: &Option<OsString>| v.clone().filter(|s| !s.is_empty());

        if let Some(user) = non_empty(&self.sudo_user).filter(|u| u != "root") {
            return Some(PathBuf::from("/home").join(user).join(".config"));
        }
        non_empty(&self.xdg_config_home)
            .map(PathBuf::from)
            .or_else(|| non_empty(&self.home).map(|h| PathBuf::from(h).join(".config")))
    }
}

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`StorageError::NoConfigDir`] when no base directory can be
/// derived from the environment.
pub fn config_file_path() -> Result<PathBuf, StorageError> {
    config_file_path_in(&ConfigEnv::from_process())
}

fn config_file_path_in(env: &ConfigEnv) -> Result<PathBuf, StorageError> {
    env.config_base()
        .map(|base| base.join(APP_DIR).join(FILE_NAME))
        .ok_or(StorageError::NoConfigDir)
}

/// Loads the configuration.
///
/// With `explicit = Some(path)` the file must exist.  Otherwise the default
/// location is used and a missing file yields [`AppConfig::default()`].
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors and
/// [`StorageError::Parse`] if the TOML is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, StorageError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = config_file_path()?;
            load_or_default(&path)
        }
    }
}

/// Reads `path`, returning defaults when it does not exist.
pub fn load_or_default(path: &Path) -> Result<LoadedConfig, StorageError> {
    match read_config(path) {
        Err(StorageError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(LoadedConfig {
                config: AppConfig::default(),
                source: ConfigSource::Defaults(path.to_path_buf()),
            })
        }
        other => other,
    }
}

fn read_config(path: &Path) -> Result<LoadedConfig, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedConfig {
        config: toml::from_str(&content)?,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
