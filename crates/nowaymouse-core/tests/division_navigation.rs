//! Integration tests for division navigation driven from a TOML configuration.
//!
//! These exercise the path the daemon takes: parse the file, validate it into
//! [`Settings`], translate pressed key codes to names, feed them to the
//! navigator, and encode what the overlay should show.

use nowaymouse_core::{
    keymap, AppConfig, DivisionNavigator, OverlayCommand, Point, Settings, Step,
};

const TWO_LEVEL: &str = r#"
    [screen]
    width = 1000
    height = 800

    [[division.levels]]
    cols = 2
    rows = 1
    labels = ["a", "b"]

    [[division.levels]]
    cols = 1
    rows = 2
    labels = ["x", "y"]
"#;

fn settings(text: &str) -> Settings {
    let cfg: AppConfig = toml::from_str(text).expect("config must parse");
    Settings::from_config(&cfg).expect("config must validate")
}

/// Presses the key with evdev name `name` and returns the navigator's step.
fn press(nav: &mut DivisionNavigator, name: &str) -> Step {
    let code = keymap::name_to_code(name).expect("known key");
    let label = keymap::code_to_name(code).expect("named key");
    nav.press(label)
}

#[test]
fn test_two_level_descent_emits_show_per_level_and_final_target() {
    // Arrange
    let settings = settings(TWO_LEVEL);
    let mut nav = DivisionNavigator::new(settings.division.clone());

    // Act
    let first = OverlayCommand::show(nav.enter()).encode();
    let descend = press(&mut nav, "B");
    let select = press(&mut nav, "Y");

    // Assert
    assert_eq!(first, "show,0,0,0,1000,800,2,1");
    let Step::Descend { target, next } = descend else {
        panic!("expected Descend, got {descend:?}");
    };
    assert_eq!(target.to_pixels(), (750, 400));
    assert_eq!(OverlayCommand::show(next).encode(), "show,1,500,0,500,800,1,2");
    assert_eq!(select, Step::Selected { target: Point::new(750.0, 600.0) });
    assert!(!nav.is_active());
}

#[test]
fn test_single_level_corners() {
    let settings = settings(
        r#"
        [screen]
        width = 1000
        height = 800

        [[division.levels]]
        cols = 2
        rows = 2
        labels = ["Q", "W", "A", "S"]
        "#,
    );
    let mut nav = DivisionNavigator::new(settings.division);

    nav.enter();
    assert_eq!(press(&mut nav, "Q"), Step::Selected { target: Point::new(250.0, 200.0) });
    nav.enter();
    assert_eq!(press(&mut nav, "S"), Step::Selected { target: Point::new(750.0, 600.0) });
}

#[test]
fn test_unlabelled_key_aborts_single_character_level() {
    let settings = settings(TWO_LEVEL);
    let mut nav = DivisionNavigator::new(settings.division);
    nav.enter();

    assert_eq!(press(&mut nav, "Z"), Step::Aborted);
    assert!(!nav.is_active());
}

#[test]
fn test_default_configuration_reaches_every_final_cell() {
    // Every (level-0, level-1) label pair selects a distinct on-screen target.
    let settings = Settings::from_config(&AppConfig::default()).expect("defaults validate");
    let grid = settings.division.clone();
    let (width, height) = (settings.screen_width as f64, settings.screen_height as f64);
    let mut seen = std::collections::HashSet::new();

    for outer in grid.levels()[0].labels() {
        for inner in grid.levels()[1].labels() {
            let mut nav = DivisionNavigator::new(grid.clone());
            nav.enter();
            assert!(matches!(nav.press(outer), Step::Descend { .. }));
            let Step::Selected { target } = nav.press(inner) else {
                panic!("{outer}{inner} did not select");
            };
            assert!(target.x > 0.0 && target.x < width);
            assert!(target.y > 0.0 && target.y < height);
            assert!(seen.insert(target.to_pixels()), "{outer}{inner} collides");
        }
    }
    assert_eq!(seen.len(), 15 * 9);
}

#[test]
fn test_prefix_conflict_is_fatal_at_load() {
    let cfg: AppConfig = toml::from_str(
        r#"
        [[division.levels]]
        cols = 2
        rows = 1
        labels = ["Q", "QW"]
        "#,
    )
    .unwrap();

    let err = Settings::from_config(&cfg).unwrap_err();

    assert!(err.to_string().contains("`Q` is a prefix of `QW`"));
}
