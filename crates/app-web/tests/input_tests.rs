// Host-side tests for pure input helpers.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use input::*;

#[test]
fn track_reports_deltas_only_while_down() {
    let mut pointer = PointerState::default();
    assert_eq!(pointer.track(10.0, 10.0), glam::Vec2::ZERO);

    pointer.down = true;
    let delta = pointer.track(14.0, 7.0);
    assert_eq!(delta, glam::Vec2::new(4.0, -3.0));

    pointer.down = false;
    assert_eq!(pointer.track(100.0, 100.0), glam::Vec2::ZERO);
    // Position still tracked while up, so the next drag starts cleanly.
    pointer.down = true;
    assert_eq!(pointer.track(101.0, 100.0), glam::Vec2::new(1.0, 0.0));
}

#[test]
fn wheel_notches_sign() {
    assert_eq!(wheel_notches(120.0), 1.0);
    assert_eq!(wheel_notches(-120.0), -1.0);
    assert_eq!(wheel_notches(0.0), 0.0);
}
