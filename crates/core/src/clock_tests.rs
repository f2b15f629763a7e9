use super::*;
use chrono::TimeZone;

#[test]
fn fixed_clock_always_returns_the_same_instant() {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FixedClock(at);
    assert_eq!(clock.now(), at);
    assert_eq!(clock.now(), at);
}

#[test]
fn system_clock_is_monotonic_non_decreasing() {
    let clock = SystemClock;
    let first = clock.now();
    let second = clock.now();
    assert!(second >= first);
}
