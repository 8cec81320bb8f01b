//! Tracking-space vectors and orientations.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in tracking space, meters.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::Vec3;
///
/// let a = Vec3::new(1.0, 2.0, 2.0);
/// assert!((a.length() - 3.0).abs() < 1e-12);
/// assert!((a.distance(Vec3::ZERO) - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        let [x, y, z] = v;
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    /// Rotate about the x axis by `radians` (right-handed).
    pub fn rotate_x(self, radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x: self.x,
            y: self.y * c - self.z * s,
            z: self.y * s + self.z * c,
        }
    }

    /// Rotate about the y axis by `radians` (right-handed).
    pub fn rotate_y(self, radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x: self.x * c + self.z * s,
            y: self.y,
            z: -self.x * s + self.z * c,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Euler orientation in degrees as reported by the pose source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn yaw_radians(&self) -> f64 {
        self.yaw.to_radians()
    }
}

/// A local frame tilted about the x axis around an anchor point.
///
/// Used by the wheel so that pitch does not leak into the steering angle:
/// points are translated to the anchor and rotated by `-pitch`.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::{TiltedFrame, Vec3};
///
/// let frame = TiltedFrame::new(Vec3::new(0.0, 1.0, 0.0), 90.0);
/// // A point straight "up" the tilted plane ends up on the local +y axis.
/// let local = frame.to_local(Vec3::new(0.0, 1.0, 0.2));
/// assert!((local.y - 0.2).abs() < 1e-9);
/// assert!(local.z.abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltedFrame {
    origin: Vec3,
    pitch_rad: f64,
}

impl TiltedFrame {
    pub fn new(origin: Vec3, pitch_deg: f64) -> Self {
        Self {
            origin,
            pitch_rad: pitch_deg.to_radians(),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn to_local(&self, p: Vec3) -> Vec3 {
        (p - self.origin).rotate_x(-self.pitch_rad)
    }

    /// Rotate a direction (no translation) into the local frame.
    pub fn dir_to_local(&self, d: Vec3) -> Vec3 {
        d.rotate_x(-self.pitch_rad)
    }
}
