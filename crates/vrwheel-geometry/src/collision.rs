//! Segment distance and capsule containment.

use crate::Vec3;

/// Shortest distance from `p` to the segment `a..b`.
///
/// A degenerate segment (`a == b`) is treated as a point.
pub fn point_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// A swept sphere between two points.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::{Capsule, Vec3};
///
/// let stick = Capsule::new(Vec3::ZERO, Vec3::new(0.0, 0.2, 0.0), 0.05);
/// assert!(stick.contains(Vec3::new(0.04, 0.1, 0.0)));
/// assert!(!stick.contains(Vec3::new(0.0, 0.3, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub base: Vec3,
    pub tip: Vec3,
    pub radius: f64,
}

impl Capsule {
    pub fn new(base: Vec3, tip: Vec3, radius: f64) -> Self {
        Self { base, tip, radius }
    }

    pub fn distance(&self, p: Vec3) -> f64 {
        point_segment_distance(p, self.base, self.tip)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.distance(p) <= self.radius
    }
}
