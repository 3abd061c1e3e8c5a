use std::f64::consts::TAU;

use crate::foundation::core::Vec2;

/// Split `v` into `(radius, angle)` with the angle in `(-pi, pi]`.
pub(crate) fn to_polar(v: Vec2) -> (f64, f64) {
    (v.length(), v.angle())
}

/// Inverse of [`to_polar`]; `angle` may lie on any branch.
pub(crate) fn from_polar(radius: f64, angle: f64) -> Vec2 {
    Vec2::from_angle(angle) * radius
}

/// Shift `angle` by whole turns so it lies within half a turn of `reference`.
pub(crate) fn nearest_branch(angle: f64, reference: f64) -> f64 {
    angle + TAU * ((reference - angle) / TAU).round()
}

pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
