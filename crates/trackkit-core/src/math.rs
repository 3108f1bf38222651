//! Angle and vector helpers shared by all geometry code.
//!
//! World space is y-up. A heading is a yaw in radians; heading 0 faces +Z and
//! a positive heading turns the forward vector toward -X, so a curve with
//! direction `+1` (turning toward local +X) decreases the heading.

use nalgebra::{Point3, Rotation3, Vector3};
use std::f64::consts::{PI, TAU};

/// World-space position.
pub type Position = Point3<f64>;

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// Signed shortest difference `a - b`, in `(-PI, PI]`.
///
/// Raw subtraction breaks at the wraparound: headings of `3.1` and `-3.1` are
/// only ~0.08 rad apart, not 6.2.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}

/// Rotation about the vertical axis for the given heading.
pub fn yaw_rotation(heading: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), -heading)
}

/// Rotates a local offset into world orientation.
pub fn rotate_by_heading(offset: &Vector3<f64>, heading: f64) -> Vector3<f64> {
    yaw_rotation(heading) * offset
}

/// Unit forward vector for a heading.
pub fn forward(heading: f64) -> Vector3<f64> {
    rotate_by_heading(&Vector3::z(), heading)
}

/// Smootherstep ramp `t^3 (6t^2 - 15t + 10)` on a clamped `t`.
///
/// Continuous first and second derivatives at both ends.
pub fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Horizontal+vertical distance between two positions.
pub fn distance(a: &Position, b: &Position) -> f64 {
    nalgebra::distance(a, b)
}
