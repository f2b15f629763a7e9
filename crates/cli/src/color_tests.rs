use super::*;
use serial_test::serial;

#[test]
#[serial]
fn status_leaves_text_uncolored_without_color_forced() {
    std::env::remove_var("COLOR");
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(status("COMPLETED"), "COMPLETED");
    std::env::remove_var("NO_COLOR");
}

#[test]
#[serial]
fn status_colors_known_states_when_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
    assert!(status("COMPLETED").contains("\x1b[32m"));
    assert!(status("FAILED").contains("\x1b[31m"));
    assert!(status("CANCELED").contains("\x1b[31m"));
    assert!(status("RUNNING").contains("\x1b[33m"));
    assert_eq!(status("UNKNOWN"), "UNKNOWN");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn should_colorize_respects_no_color_over_color() {
    std::env::set_var("COLOR", "1");
    std::env::set_var("NO_COLOR", "1");
    assert!(!should_colorize());
    std::env::remove_var("COLOR");
    std::env::remove_var("NO_COLOR");
}
