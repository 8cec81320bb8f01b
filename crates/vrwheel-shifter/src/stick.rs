//! Physical stick geometry: hand position to deflection, cell to knob.

use serde::{Deserialize, Serialize};
use vrwheel_geometry::{Capsule, Vec3};

use crate::grid::Deflection;
use crate::types::{GridCell, ReverseCorner};

pub const DEFAULT_CAPSULE_RADIUS: f64 = 0.05;
pub const DEFAULT_STICK_LENGTH: f64 = 0.3165;

/// Where the shifter stands and how far its knob travels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickGeometry {
    /// Pivot at the base of the stick.
    pub origin: Vec3,
    /// Pivot to knob, also the knob height above the pivot.
    pub stick_length: f64,
    /// Tilt of the stick at full deflection, degrees.
    pub tilt_deg: f64,
    /// Travel multiplier, 1.0 = 100%.
    pub scale: f64,
    pub capsule_radius: f64,
}

impl Default for StickGeometry {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.25, -0.57, -0.15),
            stick_length: DEFAULT_STICK_LENGTH,
            tilt_deg: 6.0,
            scale: 1.0,
            capsule_radius: DEFAULT_CAPSULE_RADIUS,
        }
    }
}

impl StickGeometry {
    /// Knob travel in meters for a full deflection. Never zero.
    pub fn travel(&self) -> f64 {
        let t = self.stick_length * self.tilt_deg.to_radians().sin() * self.scale;
        if t.is_finite() && t.abs() > 1e-6 {
            t.abs()
        } else {
            1e-6
        }
    }

    /// Knob position with the stick upright.
    pub fn rest_knob(&self) -> Vec3 {
        self.origin + Vec3::new(0.0, self.stick_length, 0.0)
    }

    /// Normalized deflection of a knob target, measured in a frame turned
    /// by `yaw_rad` about the vertical axis.
    pub fn deflection(&self, target: Vec3, yaw_rad: f64) -> Deflection {
        let local = (target - self.rest_knob()).rotate_y(-yaw_rad);
        let travel = self.travel();
        Deflection::new(local.x / travel, local.z / travel)
    }

    /// Knob position for a normalized deflection.
    pub fn knob_at(&self, deflection: Deflection, yaw_rad: f64) -> Vec3 {
        let travel = self.travel();
        let offset = Vec3::new(deflection.x * travel, 0.0, deflection.z * travel).rotate_y(yaw_rad);
        self.rest_knob() + offset
    }

    pub fn knob_for_cell(&self, cell: GridCell, corner: ReverseCorner, yaw_rad: f64) -> Vec3 {
        let (x, z) = cell.position(corner);
        self.knob_at(Deflection { x, z }, yaw_rad)
    }

    /// Collision volume from the pivot to `knob`.
    pub fn capsule(&self, knob: Vec3) -> Capsule {
        Capsule::new(self.origin, knob, self.capsule_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrwheel_test_helpers::assert_approx_eq;

    #[test]
    fn test_travel_matches_tilt() {
        let g = StickGeometry::default();
        let expected = DEFAULT_STICK_LENGTH * 6.0f64.to_radians().sin();
        assert_approx_eq!(g.travel(), expected, 1e-12);
    }

    #[test]
    fn test_degenerate_travel_is_positive() {
        let g = StickGeometry {
            tilt_deg: 0.0,
            ..StickGeometry::default()
        };
        assert!(g.travel() > 0.0);
    }

    #[test]
    fn test_deflection_of_knob_position_roundtrip() {
        let g = StickGeometry::default();
        let yaw = 0.4;
        let knob = g.knob_at(Deflection::new(0.5, -0.25), yaw);
        let d = g.deflection(knob, yaw);
        assert_approx_eq!(d.x, 0.5, 1e-9);
        assert_approx_eq!(d.z, -0.25, 1e-9);
    }

    #[test]
    fn test_deflection_is_clamped() {
        let g = StickGeometry::default();
        let far = g.rest_knob() + Vec3::new(5.0, 0.0, -5.0);
        let d = g.deflection(far, 0.0);
        assert_approx_eq!(d.x, 1.0, 1e-12);
        assert_approx_eq!(d.z, -1.0, 1e-12);
    }

    #[test]
    fn test_capsule_covers_stick() {
        let g = StickGeometry::default();
        let capsule = g.capsule(g.rest_knob());
        let mid = g.origin.midpoint(g.rest_knob());
        assert!(capsule.contains(mid + Vec3::new(0.04, 0.0, 0.0)));
        assert!(!capsule.contains(mid + Vec3::new(0.06, 0.0, 0.0)));
    }
}
