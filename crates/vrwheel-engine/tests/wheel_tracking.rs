//! Wheel tracking driven directly through `WheelTracker::update`.

use proptest::prelude::*;
use vrwheel_engine::{WheelInput, WheelParams, WheelTracker};
use vrwheel_geometry::{Vec3, wrap_to_pi};
use vrwheel_test_helpers::{assert_approx_eq, fixtures::ring_point};

fn params(range_deg: f64) -> WheelParams {
    WheelParams {
        center: Vec3::new(0.0, 1.0, -0.4),
        radius: 0.2,
        pitch_deg: 0.0,
        range_deg,
        ..WheelParams::default()
    }
}

fn rim(p: &WheelParams, angle_deg: f64) -> Vec3 {
    Vec3::from_array(ring_point(p.center.to_array(), p.radius, angle_deg, p.pitch_deg))
}

fn left(p: Vec3) -> WheelInput {
    WheelInput {
        holders: [Some(p), None],
        ..WheelInput::default()
    }
}

fn both(l: Vec3, r: Vec3) -> WheelInput {
    WheelInput {
        holders: [Some(l), Some(r)],
        ..WheelInput::default()
    }
}

#[test]
fn test_single_hand_unwraps_across_the_seam() {
    let p = params(1440.0);
    let mut wheel = WheelTracker::new(p);
    let committed: Vec<f64> = [0.0, 10.0, 20.0, 350.0]
        .into_iter()
        .map(|deg| wheel.update(&left(rim(&p, deg))).angle.to_degrees())
        .collect();
    for (got, want) in committed.iter().zip([0.0, 10.0, 20.0, -10.0]) {
        assert_approx_eq!(*got, want, 1e-9);
    }
}

#[test]
fn test_two_hand_snap_then_release_is_continuous() {
    let p = params(1440.0);
    let mut wheel = WheelTracker::new(p);

    // Hands grab across the rim at 45 degrees; the wheel must not jump.
    let out = wheel.update(&both(rim(&p, 225.0), rim(&p, 45.0)));
    assert!(wheel.is_snapped());
    assert_approx_eq!(out.angle, 0.0, 1e-9);

    let out = wheel.update(&both(rim(&p, 235.0), rim(&p, 55.0)));
    assert_approx_eq!(out.angle.to_degrees(), 10.0, 1e-9);

    // Left lets go: the right hand takes over from the same angle.
    let out = wheel.update(&WheelInput {
        holders: [None, Some(rim(&p, 55.0))],
        ..WheelInput::default()
    });
    assert!(!wheel.is_snapped());
    assert_approx_eq!(out.angle.to_degrees(), 10.0, 1e-9);

    let out = wheel.update(&WheelInput {
        holders: [None, Some(rim(&p, 60.0))],
        ..WheelInput::default()
    });
    assert_approx_eq!(out.angle.to_degrees(), 15.0, 1e-9);
}

#[test]
fn test_limiter_pins_and_stays_pinned() {
    let p = params(90.0);
    let mut wheel = WheelTracker::new(p);
    wheel.update(&left(rim(&p, 0.0)));
    wheel.update(&left(rim(&p, 30.0)));

    let first = wheel.update(&left(rim(&p, 60.0)));
    assert!(first.limit_hit);
    assert!(first.newly_pinned);
    assert_approx_eq!(first.angle.to_degrees(), 30.0, 1e-9);

    let again = wheel.update(&left(rim(&p, 60.0)));
    assert!(again.limit_hit);
    assert!(!again.newly_pinned);
    assert_approx_eq!(again.angle, first.angle, 1e-12);
    assert_eq!(again.axis, first.axis);
}

#[test]
fn test_released_wheel_returns_to_center() {
    let p = params(900.0);
    let mut wheel = WheelTracker::new(p);
    wheel.update(&left(rim(&p, 0.0)));
    wheel.update(&left(rim(&p, 20.0)));
    wheel.update(&left(rim(&p, 20.0)));

    for _ in 0..200 {
        wheel.update(&WheelInput::default());
    }
    assert_approx_eq!(wheel.angle(), 0.0, 1e-9);
    assert_eq!(wheel.axis_value(), 0x4000);
}

proptest! {
    #[test]
    fn prop_single_hand_angle_is_continuous(
        raws in proptest::collection::vec(-179.0f64..179.0, 1..40),
    ) {
        let p = params(1.0e6);
        let mut wheel = WheelTracker::new(p);
        let mut previous: Option<f64> = None;
        let first = raws.first().copied().unwrap_or_default().to_radians();
        for deg in raws {
            let out = wheel.update(&left(rim(&p, deg)));
            if let Some(prev) = previous {
                prop_assert!((out.angle - prev).abs() <= std::f64::consts::PI + 1e-9);
            }
            let expected = deg.to_radians() - first;
            prop_assert!(wrap_to_pi(out.angle - expected).abs() < 1e-6);
            previous = Some(out.angle);
        }
    }
}
