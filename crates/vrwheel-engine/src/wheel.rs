//! Continuous steering angle from one or two hands on the rim.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vrwheel_config::WheelSettings;
use vrwheel_geometry::{AngleHistory, DEFAULT_HISTORY_LEN, TiltedFrame, Vec3, unit_to_axis, wrap_to_pi};

use crate::pose::Hand;

/// How far from the rim a grip press still grabs, meters.
pub const WHEEL_REACH: f64 = 0.25;
/// Half-width of the automatic holding envelope, meters.
pub const HOLD_BAND: f64 = 0.10;
pub const NEAR_CENTER_FRACTION: f64 = 0.08;
pub const INERTIA: f64 = 0.95;
/// Turn speed given back after hitting the rotation limit, rad/frame.
pub const LIMIT_REBOUND: f64 = 0.01;
pub const LIMIT_PULSE_MICROS: u16 = 3000;
/// Base centering step at 100% center force, rad/frame.
pub const BASE_CENTERING_STEP: f64 = PI / 180.0;

const REBOUND_SETTLED: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelParams {
    pub center: Vec3,
    pub radius: f64,
    pub pitch_deg: f64,
    /// Lock-to-lock rotation, degrees.
    pub range_deg: f64,
    /// 1.0 = 100%.
    pub center_force: f64,
    pub inertia: f64,
    pub history_len: usize,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self::from_settings(&WheelSettings::default())
    }
}

impl WheelParams {
    pub fn from_settings(settings: &WheelSettings) -> Self {
        Self {
            center: Vec3::from_array(settings.center),
            radius: settings.radius(),
            pitch_deg: settings.pitch,
            range_deg: f64::from(settings.degrees),
            center_force: f64::from(settings.centerforce) / 100.0,
            inertia: INERTIA,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }

    pub fn range_rad(&self) -> f64 {
        self.range_deg.to_radians()
    }

    pub fn centering_step(&self) -> f64 {
        BASE_CENTERING_STEP * self.center_force
    }
}

/// Per-frame input to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    /// Positions of the hands holding the wheel, indexed by [`Hand::index`].
    pub holders: [Option<Vec3>; 2],
    /// Allow two hands to fall back to one-hand tracking when they drift
    /// apart (automatic grabbing).
    pub unsnap: bool,
    /// Latest smoothed FFB magnitude when FFB drives the centering.
    pub ffb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelOutput {
    pub angle: f64,
    pub axis: i32,
    /// The limiter clamped the angle this frame.
    pub limit_hit: bool,
    /// First frame of a limit hit.
    pub newly_pinned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSnapshot {
    pub center: Vec3,
    pub radius: f64,
    pub pitch: f64,
    pub angle: f64,
    pub snapped: bool,
    pub grabbed: [bool; 2],
}

#[derive(Debug, Clone)]
pub struct WheelTracker {
    params: WheelParams,
    frame: TiltedFrame,
    history: AngleHistory,
    turn_speed: f64,
    snapped: bool,
    single: Option<Hand>,
    offset: f64,
    pivot: f64,
    rebound: bool,
    pinned: bool,
    grabbed: [bool; 2],
}

impl Default for WheelTracker {
    fn default() -> Self {
        Self::new(WheelParams::default())
    }
}

impl WheelTracker {
    pub fn new(params: WheelParams) -> Self {
        Self {
            params,
            frame: TiltedFrame::new(params.center, params.pitch_deg),
            history: AngleHistory::new(params.history_len),
            turn_speed: 0.0,
            snapped: false,
            single: None,
            offset: 0.0,
            pivot: 0.0,
            rebound: false,
            pinned: false,
            grabbed: [false; 2],
        }
    }

    pub fn params(&self) -> &WheelParams {
        &self.params
    }

    pub fn angle(&self) -> f64 {
        self.history.latest()
    }

    pub fn turn_speed(&self) -> f64 {
        self.turn_speed
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped
    }

    pub fn history(&self) -> &AngleHistory {
        &self.history
    }

    /// Move or resize the wheel without touching its angle.
    pub fn set_geometry(&mut self, center: Vec3, radius: f64) {
        self.params.center = center;
        self.params.radius = radius;
        self.frame = TiltedFrame::new(center, self.params.pitch_deg);
    }

    /// Hand position in the wheel's tilted frame.
    pub fn local(&self, p: Vec3) -> Vec3 {
        self.frame.to_local(p)
    }

    /// Within grabbing distance of the rim.
    pub fn within_reach(&self, p: Vec3) -> bool {
        let l = self.local(p);
        let ring = (l.x.hypot(l.y) - self.params.radius).hypot(l.z);
        ring <= WHEEL_REACH
    }

    /// Inside the automatic holding envelope around the rim.
    pub fn in_envelope(&self, p: Vec3) -> bool {
        let l = self.local(p);
        let radial = l.x.hypot(l.y);
        let r = self.params.radius;
        l.z.abs() < HOLD_BAND && radial >= r - HOLD_BAND && radial <= r + HOLD_BAND
    }

    /// Hands too far apart, or their midpoint too far from the hub, for a
    /// two-hand hold.
    pub fn ready_to_unsnap(&self, left: Vec3, right: Vec3) -> bool {
        let size = self.params.radius * 2.0;
        left.distance(right) > size || self.params.center.distance(left.midpoint(right)) > size
    }

    fn single_raw(&mut self, p: Vec3) -> f64 {
        let l = self.local(p);
        let r = l.x.hypot(l.y);
        let threshold = NEAR_CENTER_FRACTION * self.params.radius;
        if !r.is_finite() {
            return self.pivot;
        }
        if r >= threshold {
            self.pivot = l.y.atan2(l.x);
            return self.pivot;
        }
        let bearing = if r > 0.0 { l.y.atan2(l.x) } else { self.pivot };
        let w = if threshold > 0.0 {
            (r / threshold).powi(2)
        } else {
            0.0
        };
        self.pivot + w * wrap_to_pi(bearing - self.pivot)
    }

    fn double_raw(&self, left: Vec3, right: Vec3) -> f64 {
        let d = self.local(right) - self.local(left);
        if d.x.hypot(d.y) < 1e-9 {
            return self.history.latest() - self.offset;
        }
        d.y.atan2(d.x)
    }

    fn track_single(&mut self, hand: Hand, p: Vec3) -> f64 {
        let raw = self.single_raw(p);
        if self.snapped || self.single != Some(hand) {
            self.snapped = false;
            self.single = Some(hand);
            self.offset = self.history.latest() - raw;
            trace!(%hand, offset = self.offset, "one-hand grab");
        }
        raw
    }

    pub fn update(&mut self, input: &WheelInput) -> WheelOutput {
        let [left, right] = input.holders;
        self.grabbed = [left.is_some(), right.is_some()];

        let raw = match (left, right) {
            (Some(l), Some(r)) if !(input.unsnap && self.ready_to_unsnap(l, r)) => {
                let raw = self.double_raw(l, r);
                if !self.snapped {
                    self.snapped = true;
                    self.single = None;
                    self.offset = self.history.latest() - raw;
                    debug!(offset = self.offset, "two-hand snap");
                }
                Some(raw)
            }
            (_, Some(r)) => Some(self.track_single(Hand::Right, r)),
            (Some(l), None) => Some(self.track_single(Hand::Left, l)),
            (None, None) => {
                self.snapped = false;
                self.single = None;
                None
            }
        };

        match raw {
            Some(raw) => {
                self.rebound = false;
                self.history.push_unwrapped(raw + self.offset);
                self.turn_speed = self.history.last_delta();
            }
            None => {
                let next = self.history.latest() + self.turn_speed;
                self.history.push(next);
                self.turn_speed *= self.params.inertia;
                if self.rebound && self.turn_speed.abs() < REBOUND_SETTLED {
                    self.rebound = false;
                }
                if !self.rebound {
                    self.center(input.ffb);
                }
            }
        }

        let limit_hit = self.limit();
        let newly_pinned = limit_hit && !self.pinned;
        self.pinned = limit_hit;
        let angle = self.history.latest();
        WheelOutput {
            angle,
            axis: self.axis_value(),
            limit_hit,
            newly_pinned,
        }
    }

    fn center(&mut self, ffb: Option<f64>) {
        let mut step = self.params.centering_step();
        if let Some(m) = ffb {
            step *= if m.is_finite() { m.abs().min(1.0) } else { 0.0 };
        }
        if !(step > 0.0) {
            return;
        }
        let a = self.history.latest();
        let next = if a.abs() < step {
            0.0
        } else {
            a - step * a.signum()
        };
        self.history.set_latest(next);
    }

    /// Hard stop at half the range; returns whether it engaged.
    fn limit(&mut self) -> bool {
        let half = self.params.range_rad() / 2.0;
        let latest = self.history.latest();
        if latest.abs() <= half {
            return false;
        }
        let prev = self.history.previous();
        let pinned = if prev.abs() <= half {
            prev
        } else {
            half.copysign(latest)
        };
        self.history.set_latest(pinned);
        self.turn_speed = -latest.signum() * LIMIT_REBOUND;
        self.rebound = true;
        if !self.pinned {
            debug!(angle = pinned.to_degrees(), "rotation limit");
        }
        true
    }

    /// Current angle as a controller axis value, centered at 0x4000.
    pub fn axis_value(&self) -> i32 {
        let range = self.params.range_rad();
        if !(range > 0.0) {
            return unit_to_axis(0.5);
        }
        unit_to_axis(0.5 - self.history.latest() / range)
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            center: self.params.center,
            radius: self.params.radius,
            pitch: self.params.pitch_deg,
            angle: self.history.latest(),
            snapped: self.snapped,
            grabbed: self.grabbed,
        }
    }
}
