//! Motorcycle handlebar: lean angle from sideways hand travel.

use serde::{Deserialize, Serialize};
use vrwheel_config::BikeSettings;
use vrwheel_geometry::{Vec3, clamped_acos, clamped_asin, unit_to_axis};

pub const HANDLEBAR_SIZE: f64 = 0.80;
/// Handlebar tilt toward the rider, degrees.
pub const HANDLEBAR_PITCH: f64 = 20.0;
/// Grip point inset from each bar end, meters.
const GRIP_INSET: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BikeSnapshot {
    pub center: Vec3,
    pub lean_deg: f64,
    /// Sideways shift of the bar top for the current lean.
    pub x_offset: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BikeOutput {
    pub lean_deg: f64,
    pub axis: i32,
}

/// The bike pivots about a point `height` below the bars; each hand rides
/// on the bar `hand_offset` from the middle.
#[derive(Debug, Clone)]
pub struct BikeTracker {
    center: Vec3,
    max_lean_deg: f64,
    height: f64,
    /// Pivot to a grip point.
    arm: f64,
    /// Angle of that arm above the bar at rest.
    arm_angle: f64,
    lean_deg: f64,
    x_offset: f64,
}

impl Default for BikeTracker {
    fn default() -> Self {
        Self::new(&BikeSettings::default())
    }
}

impl BikeTracker {
    pub fn new(settings: &BikeSettings) -> Self {
        let height = settings.handlebar_height / 100.0;
        let hand_offset = HANDLEBAR_SIZE / 2.0 - GRIP_INSET;
        Self {
            center: Vec3::from_array(settings.center),
            max_lean_deg: settings.max_lean.abs().max(f64::EPSILON),
            height,
            arm: height.hypot(hand_offset),
            arm_angle: height.atan2(hand_offset),
            lean_deg: 0.0,
            x_offset: 0.0,
        }
    }

    pub fn lean_deg(&self) -> f64 {
        self.lean_deg
    }

    fn evaluate(&self, left: Option<Vec3>, right: Option<Vec3>) -> Option<f64> {
        let lean = match (left, right) {
            (Some(l), Some(r)) => {
                let x_mid = l.midpoint(r).x - self.center.x;
                clamped_asin(x_mid / self.height)
            }
            (Some(l), None) => {
                let x = l.x - self.center.x;
                std::f64::consts::PI - clamped_acos(x / self.arm) - self.arm_angle
            }
            (None, Some(r)) => {
                let x = r.x - self.center.x;
                self.arm_angle - clamped_acos(x / self.arm)
            }
            (None, None) => return None,
        };
        lean.is_finite().then(|| {
            lean.to_degrees()
                .clamp(-self.max_lean_deg, self.max_lean_deg)
        })
    }

    /// Update from the hands holding the bars; with no hands the lean holds.
    pub fn update(&mut self, left: Option<Vec3>, right: Option<Vec3>) -> BikeOutput {
        if let Some(lean) = self.evaluate(left, right) {
            self.lean_deg = lean;
            self.x_offset = self.height * lean.to_radians().sin();
        }
        BikeOutput {
            lean_deg: self.lean_deg,
            axis: unit_to_axis((self.lean_deg / self.max_lean_deg + 1.0) / 2.0),
        }
    }

    pub fn snapshot(&self) -> BikeSnapshot {
        BikeSnapshot {
            center: self.center,
            lean_deg: self.lean_deg,
            x_offset: self.x_offset,
            pitch: HANDLEBAR_PITCH,
        }
    }
}
