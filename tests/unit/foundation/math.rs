use super::*;
use std::f64::consts::{FRAC_PI_2, PI};

#[test]
fn polar_roundtrip_on_axes() {
    let (r, a) = to_polar(Vec2::new(0.0, 3.0));
    assert!((r - 3.0).abs() < 1e-12);
    assert!((a - FRAC_PI_2).abs() < 1e-12);

    let v = from_polar(2.0, PI);
    assert!((v.x + 2.0).abs() < 1e-12);
    assert!(v.y.abs() < 1e-12);
}

#[test]
fn polar_of_x_axis_is_exact() {
    assert_eq!(to_polar(Vec2::new(10.0, 0.0)), (10.0, 0.0));
    assert_eq!(from_polar(10.0, 0.0), Vec2::new(10.0, 0.0));
}

#[test]
fn nearest_branch_follows_reference_across_turns() {
    let a = nearest_branch(0.1, 4.0 * PI);
    assert!((a - (0.1 + 4.0 * PI)).abs() < 1e-12);

    let b = nearest_branch(PI - 0.01, -PI);
    assert!((b - (-PI - 0.01)).abs() < 1e-12);

    assert_eq!(nearest_branch(0.3, 0.2), 0.3);
}

#[test]
fn all_finite_flags_nan_and_inf() {
    assert!(all_finite(&[0.0, -1.0, 1e300]));
    assert!(!all_finite(&[0.0, f64::NAN]));
    assert!(!all_finite(&[f64::INFINITY]));
}
