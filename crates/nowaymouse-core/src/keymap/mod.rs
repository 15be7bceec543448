//! Key code ↔ key name translation.
//!
//! Key codes are Linux evdev `KEY_*` codes as read from `/dev/input/event*`
//! and written to uinput.  Names are the evdev identifiers without the `KEY_`
//! prefix (`"A"`, `"CAPSLOCK"`, `"LEFTSHIFT"`).  Configuration files refer to
//! keys by name, and the division navigator matches labels against the names
//! of pressed keys.

pub mod linux_evdev;

/// A Linux evdev key code.
pub type KeyCode = u16;

/// Returns the canonical (upper-case) name of `code`, or `None` for codes that
/// have no entry in the table.
pub fn code_to_name(code: KeyCode) -> Option<&'static str> {
    linux_evdev::name_of(code)
}

/// Resolves a key name to its code.
///
/// Matching is case-insensitive and accepts an optional `KEY_` prefix, so
/// `"w"`, `"W"` and `"KEY_W"` all resolve to the same code.  Surrounding
/// whitespace is ignored.
pub fn name_to_code(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    let upper = trimmed.to_ascii_uppercase();
    let bare = upper.strip_prefix("KEY_").unwrap_or(&upper);
    linux_evdev::code_of(bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        assert_eq!(name_to_code("w"), Some(17));
        assert_eq!(name_to_code("W"), Some(17));
        assert_eq!(name_to_code("CapsLock"), Some(58));
    }

    #[test]
    fn test_name_lookup_accepts_key_prefix() {
        assert_eq!(name_to_code("KEY_SPACE"), Some(57));
        assert_eq!(name_to_code("key_esc"), Some(1));
    }

    #[test]
    fn test_name_lookup_ignores_whitespace() {
        assert_eq!(name_to_code("  A "), Some(30));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(name_to_code("NOPE"), None);
        assert_eq!(name_to_code(""), None);
    }

    #[test]
    fn test_code_to_name_round_trips_common_keys() {
        for name in ["Q", "1", "F12", "LEFTCTRL", "COMMA", "KP5", "UP"] {
            let code = name_to_code(name).expect("known key");
            assert_eq!(code_to_name(code), Some(name));
        }
    }

    #[test]
    fn test_unmapped_code_has_no_name() {
        assert_eq!(code_to_name(0), None);
        assert_eq!(code_to_name(0x2ff), None);
    }
}
