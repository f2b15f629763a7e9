use super::*;
use chrono::{TimeZone, Utc};
use tempfile::tempdir;
use tg_core::clock::FixedClock;

fn clock_at(secs: i64) -> FixedClock {
    FixedClock(Utc.timestamp_opt(secs, 0).unwrap())
}

#[test]
fn load_status_of_missing_file_is_registered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");
    let clock = clock_at(0);
    let status = load_status(&path, &clock).unwrap();
    assert_eq!(status.state, State::Registered);
}

#[test]
fn store_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");
    let clock = clock_at(5);
    let mut status = Status::new(clock.now());
    status.set(State::Running);
    store_status(&path, &status).unwrap();

    let loaded = load_status(&path, &clock).unwrap();
    assert_eq!(loaded, status);
}

#[test]
fn set_state_preserves_ping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");
    let clock = clock_at(10);
    store_status(&path, &Status::new(clock.now())).unwrap();

    let updated = set_state(&path, State::Assigned, &clock).unwrap();
    assert_eq!(updated.state, State::Assigned);
    assert_eq!(updated.ping, clock.now());
}

#[test]
fn ping_advances_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");
    let c0 = clock_at(0);
    store_status(&path, &Status::new(c0.now())).unwrap();

    let c100 = clock_at(100);
    let updated = ping(&path, &c100).unwrap();
    assert_eq!(updated.ping, c100.now());

    let reloaded = load_status(&path, &c100).unwrap();
    assert_eq!(reloaded.ping, c100.now());
}

#[test]
fn reset_returns_to_assigned_with_fresh_ping() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");
    let clock = clock_at(0);
    let mut status = Status::new(clock.now());
    status.set(State::Failed);
    store_status(&path, &status).unwrap();

    let after = reset(&path, &clock_at(50)).unwrap();
    assert_eq!(after.state, State::Assigned);
    assert_eq!(after.ping, clock_at(50).now());
}
