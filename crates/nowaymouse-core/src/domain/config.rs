//! Configuration schema and validation.
//!
//! [`AppConfig`] mirrors the TOML file one-to-one and is what serde produces.
//! It is deliberately permissive: key names are strings and numbers are not
//! range-checked.  [`Settings::from_config`] turns it into the immutable,
//! fully-resolved form the daemon runs with, or fails with a [`ConfigError`]
//! describing the first problem found.
//!
//! ```toml
//! keyboard_input_path = "/dev/input/event3"
//!
//! [screen]
//! width = 2560
//! height = 1440
//!
//! [keybinds]
//! activation = "CAPSLOCK"
//! division = "F"
//!
//! [[division.levels]]
//! cols = 2
//! rows = 2
//! labels = ["Q", "W", "A", "S"]
//! ```
//!
//! Every section and field is optional in the file; absent values fall back to
//! the defaults below, which form a complete two-level configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::division::DivisionGrid;
use super::motion::MotionKey;
use crate::keymap::{self, KeyCode};

/// Reasons a configuration is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("keybind `{binding}` names unknown key `{name}`")]
    UnknownKey { binding: &'static str, name: String },

    #[error("keybinds `{first}` and `{second}` are both bound to `{name}`")]
    DuplicateKeybind {
        first: &'static str,
        second: &'static str,
        name: String,
    },

    #[error("screen resolution must be non-zero (got {width}x{height})")]
    ZeroResolution { width: u32, height: u32 },

    #[error("`motion.{field}` must be a positive integer")]
    InvalidSpeed { field: &'static str },

    #[error("unknown log level `{0}` (expected error, warn, info, debug, or trace)")]
    InvalidLogLevel(String),

    #[error("at least one division level is required")]
    NoDivisionLevels,

    #[error("division level {level} has shape {cols}x{rows}; both must be at least 1")]
    InvalidGridShape { level: usize, cols: u32, rows: u32 },

    #[error("division level {level} needs {expected} labels but has {actual}")]
    LabelCountMismatch {
        level: usize,
        expected: usize,
        actual: usize,
    },

    #[error("division level {level} label #{index} is empty")]
    EmptyLabel { level: usize, index: usize },

    #[error("division level {level} repeats label `{label}`")]
    DuplicateLabel { level: usize, label: String },

    #[error("division level {level}: label `{prefix}` is a prefix of `{label}`")]
    LabelPrefixConflict {
        level: usize,
        prefix: String,
        label: String,
    },

    #[error("deepest division cell is {width:.2}x{height:.2} px; must be at least 5x5")]
    CellTooSmall { width: f64, height: f64 },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// evdev node of the keyboard to grab.
    #[serde(default = "default_keyboard_input_path")]
    pub keyboard_input_path: PathBuf,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub keybinds: KeybindConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub division: DivisionConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Resolution of the screen the division grid covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: u32,
    #[serde(default = "default_screen_height")]
    pub height: u32,
}

/// Key names for every binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeybindConfig {
    #[serde(default = "default_activation")]
    pub activation: String,
    #[serde(default = "default_division")]
    pub division: String,
    #[serde(default = "default_mouse_up")]
    pub mouse_up: String,
    #[serde(default = "default_mouse_left")]
    pub mouse_left: String,
    #[serde(default = "default_mouse_down")]
    pub mouse_down: String,
    #[serde(default = "default_mouse_right")]
    pub mouse_right: String,
    #[serde(default = "default_scroll_up")]
    pub scroll_up: String,
    #[serde(default = "default_scroll_left")]
    pub scroll_left: String,
    #[serde(default = "default_scroll_down")]
    pub scroll_down: String,
    #[serde(default = "default_scroll_right")]
    pub scroll_right: String,
    #[serde(default = "default_left_click")]
    pub left_click: String,
    #[serde(default = "default_right_click")]
    pub right_click: String,
}

/// Per-tick step sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MotionConfig {
    /// Pixels moved per 16 ms tick for each held movement key.
    #[serde(default = "default_mouse_speed")]
    pub mouse_speed: u32,
    /// Wheel detents per tick for each held scroll key.
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: u32,
}

/// Behaviour flags.  Used unchanged in [`Settings`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Behavior {
    /// Left-click after the last division level selects a cell.
    #[serde(default)]
    pub click_after_select: bool,
    /// Re-enter MouseMove (instead of Idle) when a division completes.
    #[serde(default = "default_true")]
    pub return_to_move_mode: bool,
    /// Let the division key start a division directly from Idle.
    #[serde(default)]
    pub division_from_idle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DivisionConfig {
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelConfig>,
}

/// One division level: a `cols × rows` grid with labels in row-major order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelConfig {
    pub cols: u32,
    pub rows: u32,
    pub labels: Vec<String>,
}

/// How to reach (and optionally launch) the overlay renderer.  Used unchanged in
/// [`Settings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Unix socket the renderer listens on.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    /// argv of the renderer.  Empty means the renderer is started externally.
    #[serde(default)]
    pub command: Vec<String>,
    /// User to run the renderer as.  Falls back to `$SUDO_USER` at launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_keyboard_input_path() -> PathBuf {
    PathBuf::from("/dev/input/by-path/platform-i8042-serio-0-event-kbd")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_screen_width() -> u32 {
    1920
}
fn default_screen_height() -> u32 {
    1080
}
fn default_activation() -> String {
    "CAPSLOCK".to_string()
}
fn default_division() -> String {
    "F".to_string()
}
fn default_mouse_up() -> String {
    "W".to_string()
}
fn default_mouse_left() -> String {
    "A".to_string()
}
fn default_mouse_down() -> String {
    "S".to_string()
}
fn default_mouse_right() -> String {
    "D".to_string()
}
fn default_scroll_up() -> String {
    "K".to_string()
}
fn default_scroll_left() -> String {
    "H".to_string()
}
fn default_scroll_down() -> String {
    "J".to_string()
}
fn default_scroll_right() -> String {
    "L".to_string()
}
fn default_left_click() -> String {
    "SPACE".to_string()
}
fn default_right_click() -> String {
    "R".to_string()
}
fn default_mouse_speed() -> u32 {
    8
}
fn default_scroll_speed() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/overlay.sock")
}
fn default_levels() -> Vec<LevelConfig> {
    let labels = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
    vec![
        LevelConfig {
            cols: 5,
            rows: 3,
            labels: labels(&[
                "Q", "W", "E", "R", "T", //
                "A", "S", "D", "F", "G", //
                "Z", "X", "C", "V", "B",
            ]),
        },
        LevelConfig {
            cols: 3,
            rows: 3,
            labels: labels(&[
                "U", "I", "O", //
                "J", "K", "L", //
                "M", "N", "P",
            ]),
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keyboard_input_path: default_keyboard_input_path(),
            daemon: DaemonConfig::default(),
            screen: ScreenConfig::default(),
            keybinds: KeybindConfig::default(),
            motion: MotionConfig::default(),
            behavior: Behavior::default(),
            division: DivisionConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
        }
    }
}

impl Default for KeybindConfig {
    fn default() -> Self {
        Self {
            activation: default_activation(),
            division: default_division(),
            mouse_up: default_mouse_up(),
            mouse_left: default_mouse_left(),
            mouse_down: default_mouse_down(),
            mouse_right: default_mouse_right(),
            scroll_up: default_scroll_up(),
            scroll_left: default_scroll_left(),
            scroll_down: default_scroll_down(),
            scroll_right: default_scroll_right(),
            left_click: default_left_click(),
            right_click: default_right_click(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            mouse_speed: default_mouse_speed(),
            scroll_speed: default_scroll_speed(),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            click_after_select: false,
            return_to_move_mode: default_true(),
            division_from_idle: false,
        }
    }
}

impl Default for DivisionConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            command: Vec::new(),
            run_as_user: None,
        }
    }
}

// ── Validated settings ────────────────────────────────────────────────────────

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Resolved key codes for every binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinds {
    pub activation: KeyCode,
    pub division: KeyCode,
    pub left_click: KeyCode,
    pub right_click: KeyCode,
    motion: [(KeyCode, MotionKey); 8],
}

impl Keybinds {
    /// Returns the motion identity bound to `code`, if any.
    pub fn motion_key(&self, code: KeyCode) -> Option<MotionKey> {
        self.motion
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, key)| *key)
    }

    fn resolve(config: &KeybindConfig) -> Result<Self, ConfigError> {
        let named: [(&'static str, &str); 12] = [
            ("activation", &config.activation),
            ("division", &config.division),
            ("left_click", &config.left_click),
            ("right_click", &config.right_click),
            ("mouse_up", &config.mouse_up),
            ("mouse_left", &config.mouse_left),
            ("mouse_down", &config.mouse_down),
            ("mouse_right", &config.mouse_right),
            ("scroll_up", &config.scroll_up),
            ("scroll_left", &config.scroll_left),
            ("scroll_down", &config.scroll_down),
            ("scroll_right", &config.scroll_right),
        ];

        let mut codes = [0 as KeyCode; 12];
        let mut seen: HashMap<KeyCode, &'static str> = HashMap::with_capacity(named.len());
        for (slot, (binding, name)) in codes.iter_mut().zip(named) {
            let code = keymap::name_to_code(name).ok_or_else(|| ConfigError::UnknownKey {
                binding,
                name: name.to_string(),
            })?;
            if let Some(first) = seen.insert(code, binding) {
                return Err(ConfigError::DuplicateKeybind {
                    first,
                    second: binding,
                    name: keymap::code_to_name(code).unwrap_or(name).to_string(),
                });
            }
            *slot = code;
        }

        let [activation, division, left_click, right_click, rest @ ..] = codes;
        let mut motion = [(0, MotionKey::MouseUp); 8];
        for ((slot, code), key) in motion.iter_mut().zip(rest).zip(MotionKey::ALL) {
            *slot = (code, key);
        }

        Ok(Self {
            activation,
            division,
            left_click,
            right_click,
            motion,
        })
    }
}

/// The validated, immutable configuration the daemon runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub keyboard_input_path: PathBuf,
    pub log_level: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub keybinds: Keybinds,
    pub mouse_speed: i32,
    pub scroll_speed: i32,
    pub behavior: Behavior,
    pub division: DivisionGrid,
    pub overlay: OverlayConfig,
}

impl Settings {
    /// Validates `config` and resolves every key name.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.  Keybinds are checked
    /// first, then the screen, speeds, log level, and finally the division
    /// levels.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let keybinds = Keybinds::resolve(&config.keybinds)?;

        let ScreenConfig { width, height } = config.screen;
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroResolution { width, height });
        }

        let mouse_speed = positive_speed("mouse_speed", config.motion.mouse_speed)?;
        let scroll_speed = positive_speed("scroll_speed", config.motion.scroll_speed)?;

        let log_level = config.daemon.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.daemon.log_level.clone()));
        }

        let division = DivisionGrid::new(width, height, &config.division.levels)?;

        Ok(Self {
            keyboard_input_path: config.keyboard_input_path.clone(),
            log_level,
            screen_width: width,
            screen_height: height,
            keybinds,
            mouse_speed,
            scroll_speed,
            behavior: config.behavior,
            division,
            overlay: config.overlay.clone(),
        })
    }
}

fn positive_speed(field: &'static str, value: u32) -> Result<i32, ConfigError> {
    match i32::try_from(value) {
        Ok(speed) if speed > 0 => Ok(speed),
        _ => Err(ConfigError::InvalidSpeed { field }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_is_valid() {
        // Arrange
        let cfg = AppConfig::default();

        // Act
        let settings = Settings::from_config(&cfg).expect("defaults validate");

        // Assert
        assert_eq!(settings.division.len(), 2);
        assert_eq!(settings.screen_width, 1920);
        assert_eq!(settings.mouse_speed, 8);
        assert_eq!(settings.overlay.socket_path, PathBuf::from("/tmp/overlay.sock"));
        assert!(settings.behavior.return_to_move_mode);
        assert!(!settings.behavior.click_after_select);
    }

    #[test]
    fn test_default_keybinds_resolve_to_evdev_codes() {
        let settings = Settings::from_config(&AppConfig::default()).unwrap();
        let keys = &settings.keybinds;

        assert_eq!(keys.activation, 58); // CAPSLOCK
        assert_eq!(keys.division, 33); // F
        assert_eq!(keys.left_click, 57); // SPACE
        assert_eq!(keys.motion_key(30), Some(MotionKey::MouseLeft)); // A
        assert_eq!(keys.motion_key(36), Some(MotionKey::ScrollDown)); // J
        assert_eq!(keys.motion_key(32), Some(MotionKey::MouseRight)); // D
        assert_eq!(keys.motion_key(58), None);
    }

    #[test]
    fn test_default_levels_use_single_key_labels() {
        // A mistyped key must abort on the next press, not after several.
        let settings = Settings::from_config(&AppConfig::default()).unwrap();

        for level in settings.division.levels() {
            assert_eq!(level.longest_label(), 1, "labels: {:?}", level.labels());
        }
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_absent_fields() {
        // Arrange
        let text = r#"
            [screen]
            width = 2560

            [keybinds]
            activation = "rightalt"

            [behavior]
            click_after_select = true
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).expect("parse");

        // Assert
        assert_eq!(cfg.screen.width, 2560);
        assert_eq!(cfg.screen.height, 1080);
        assert_eq!(cfg.keybinds.activation, "rightalt");
        assert_eq!(cfg.keybinds.division, "F");
        assert!(cfg.behavior.click_after_select);
        assert!(cfg.behavior.return_to_move_mode);
        assert_eq!(cfg.division.levels.len(), 2);
    }

    #[test]
    fn test_division_levels_parse_in_order() {
        let text = r#"
            [[division.levels]]
            cols = 2
            rows = 1
            labels = ["A", "B"]

            [[division.levels]]
            cols = 1
            rows = 2
            labels = ["X", "Y"]
        "#;

        let cfg: AppConfig = toml::from_str(text).expect("parse");

        assert_eq!(cfg.division.levels.len(), 2);
        assert_eq!(cfg.division.levels[0].labels, vec!["A", "B"]);
        assert_eq!((cfg.division.levels[1].cols, cfg.division.levels[1].rows), (1, 2));
    }

    #[test]
    fn test_overlay_command_parses_as_argv() {
        let text = r#"
            [overlay]
            socket_path = "/run/user/1000/nowaymouse.sock"
            command = ["/usr/bin/python3", "/opt/nowaymouse/overlay.py"]
            run_as_user = "alice"
        "#;

        let cfg: AppConfig = toml::from_str(text).expect("parse");

        assert_eq!(cfg.overlay.command.len(), 2);
        assert_eq!(cfg.overlay.run_as_user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let cfg = AppConfig::default();
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&text).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.keybinds.mouse_up = "NOTAKEY".into();

        let err = Settings::from_config(&cfg).unwrap_err();

        assert_eq!(
            err,
            ConfigError::UnknownKey {
                binding: "mouse_up",
                name: "NOTAKEY".into()
            }
        );
    }

    #[test]
    fn test_duplicate_keybind_is_rejected() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.keybinds.scroll_up = "w".into();

        // Act
        let err = Settings::from_config(&cfg).unwrap_err();

        // Assert
        assert_eq!(
            err,
            ConfigError::DuplicateKeybind {
                first: "mouse_up",
                second: "scroll_up",
                name: "W".into()
            }
        );
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.screen.height = 0;

        assert!(matches!(
            Settings::from_config(&cfg),
            Err(ConfigError::ZeroResolution { width: 1920, height: 0 })
        ));
    }

    #[test]
    fn test_zero_speed_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.motion.scroll_speed = 0;

        assert_eq!(
            Settings::from_config(&cfg).unwrap_err(),
            ConfigError::InvalidSpeed { field: "scroll_speed" }
        );
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.daemon.log_level = "verbose".into();

        assert!(matches!(
            Settings::from_config(&cfg),
            Err(ConfigError::InvalidLogLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn test_log_level_is_normalised() {
        let mut cfg = AppConfig::default();
        cfg.daemon.log_level = "DEBUG".into();

        assert_eq!(Settings::from_config(&cfg).unwrap().log_level, "debug");
    }

    #[test]
    fn test_empty_division_levels_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.division.levels.clear();

        assert_eq!(
            Settings::from_config(&cfg).unwrap_err(),
            ConfigError::NoDivisionLevels
        );
    }

    #[test]
    fn test_level_label_mismatch_is_reported_with_level_index() {
        let mut cfg = AppConfig::default();
        cfg.division.levels[1].labels.pop();

        assert_eq!(
            Settings::from_config(&cfg).unwrap_err(),
            ConfigError::LabelCountMismatch {
                level: 1,
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = ConfigError::LabelPrefixConflict {
            level: 0,
            prefix: "Q".into(),
            label: "QW".into(),
        };
        assert_eq!(err.to_string(), "division level 0: label `Q` is a prefix of `QW`");
    }
}
