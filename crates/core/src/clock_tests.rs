// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_wall_time_is_recent() {
    let clock = SystemClock;
    let drift = Utc::now().signed_duration_since(clock.utc_now());
    assert!(drift.num_seconds().abs() < 5);
}

#[test]
fn fake_clock_advances_monotonic_and_wall_time_together() {
    let clock = FakeClock::new();
    let (t1, w1) = (clock.now(), clock.utc_now());
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.now().duration_since(t1), Duration::from_secs(60));
    assert_eq!(clock.utc_now().signed_duration_since(w1).num_seconds(), 60);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_millis(1500));
    assert_eq!(clock1.now().duration_since(t1), Duration::from_millis(1500));
}
