//! Linux evdev key code table.
//!
//! Values are from `linux/input-event-codes.h`.  Only keys found on ordinary
//! keyboards are listed; mouse buttons and media keys are omitted.
//!
//! The table is sorted by code so that code→name lookups can binary search.
//! Name→code lookups scan linearly; they only happen at configuration load.

use super::KeyCode;

/// `(code, name)` pairs, ascending by code.
const KEY_TABLE: &[(KeyCode, &str)] = &[
    (1, "ESC"),
    (2, "1"),
    (3, "2"),
    (4, "3"),
    (5, "4"),
    (6, "5"),
    (7, "6"),
    (8, "7"),
    (9, "8"),
    (10, "9"),
    (11, "0"),
    (12, "MINUS"),
    (13, "EQUAL"),
    (14, "BACKSPACE"),
    (15, "TAB"),
    (16, "Q"),
    (17, "W"),
    (18, "E"),
    (19, "R"),
    (20, "T"),
    (21, "Y"),
    (22, "U"),
    (23, "I"),
    (24, "O"),
    (25, "P"),
    (26, "LEFTBRACE"),
    (27, "RIGHTBRACE"),
    (28, "ENTER"),
    (29, "LEFTCTRL"),
    (30, "A"),
    (31, "S"),
    (32, "D"),
    (33, "F"),
    (34, "G"),
    (35, "H"),
    (36, "J"),
    (37, "K"),
    (38, "L"),
    (39, "SEMICOLON"),
    (40, "APOSTROPHE"),
    (41, "GRAVE"),
    (42, "LEFTSHIFT"),
    (43, "BACKSLASH"),
    (44, "Z"),
    (45, "X"),
    (46, "C"),
    (47, "V"),
    (48, "B"),
    (49, "N"),
    (50, "M"),
    (51, "COMMA"),
    (52, "DOT"),
    (53, "SLASH"),
    (54, "RIGHTSHIFT"),
    (55, "KPASTERISK"),
    (56, "LEFTALT"),
    (57, "SPACE"),
    (58, "CAPSLOCK"),
    (59, "F1"),
    (60, "F2"),
    (61, "F3"),
    (62, "F4"),
    (63, "F5"),
    (64, "F6"),
    (65, "F7"),
    (66, "F8"),
    (67, "F9"),
    (68, "F10"),
    (69, "NUMLOCK"),
    (70, "SCROLLLOCK"),
    (71, "KP7"),
    (72, "KP8"),
    (73, "KP9"),
    (74, "KPMINUS"),
    (75, "KP4"),
    (76, "KP5"),
    (77, "KP6"),
    (78, "KPPLUS"),
    (79, "KP1"),
    (80, "KP2"),
    (81, "KP3"),
    (82, "KP0"),
    (83, "KPDOT"),
    (86, "102ND"),
    (87, "F11"),
    (88, "F12"),
    (96, "KPENTER"),
    (97, "RIGHTCTRL"),
    (98, "KPSLASH"),
    (99, "SYSRQ"),
    (100, "RIGHTALT"),
    (102, "HOME"),
    (103, "UP"),
    (104, "PAGEUP"),
    (105, "LEFT"),
    (106, "RIGHT"),
    (107, "END"),
    (108, "DOWN"),
    (109, "PAGEDOWN"),
    (110, "INSERT"),
    (111, "DELETE"),
    (113, "MUTE"),
    (114, "VOLUMEDOWN"),
    (115, "VOLUMEUP"),
    (117, "KPEQUAL"),
    (119, "PAUSE"),
    (121, "KPCOMMA"),
    (125, "LEFTMETA"),
    (126, "RIGHTMETA"),
    (127, "COMPOSE"),
    (183, "F13"),
    (184, "F14"),
    (185, "F15"),
    (186, "F16"),
    (187, "F17"),
    (188, "F18"),
    (189, "F19"),
    (190, "F20"),
    (191, "F21"),
    (192, "F22"),
    (193, "F23"),
    (194, "F24"),
];

/// Returns the name for `code`.
pub fn name_of(code: KeyCode) -> Option<&'static str> {
    KEY_TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|i| KEY_TABLE[i].1)
}

/// Returns the code for an upper-case, unprefixed `name`.
pub fn code_of(name: &str) -> Option<KeyCode> {
    KEY_TABLE
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// Iterates every known key, ascending by code.
pub fn all() -> impl Iterator<Item = (KeyCode, &'static str)> {
    KEY_TABLE.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_strictly_ascending() {
        // binary_search in name_of depends on this
        for pair in KEY_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_names_are_unique_and_upper_case() {
        let mut seen = HashSet::new();
        for (_, name) in all() {
            assert!(seen.insert(name), "duplicate name {name}");
            assert_eq!(name, name.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_letter_rows_match_kernel_codes() {
        assert_eq!(code_of("Q"), Some(16));
        assert_eq!(code_of("A"), Some(30));
        assert_eq!(code_of("Z"), Some(44));
        assert_eq!(name_of(50), Some("M"));
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(code_of("UP"), Some(103));
        assert_eq!(code_of("LEFT"), Some(105));
        assert_eq!(code_of("RIGHT"), Some(106));
        assert_eq!(code_of("DOWN"), Some(108));
    }
}
