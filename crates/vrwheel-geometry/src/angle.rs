//! Angle helpers: clamped inverse trig, wrapping and the unwrap history.

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Default number of committed samples kept by the wheel.
pub const DEFAULT_HISTORY_LEN: usize = 10;

/// `acos` with its input clamped to `[-1, 1]`; NaN maps to a right angle.
pub fn clamped_acos(x: f64) -> f64 {
    if x.is_nan() {
        return FRAC_PI_2;
    }
    x.clamp(-1.0, 1.0).acos()
}

/// `asin` with its input clamped to `[-1, 1]`; NaN maps to zero.
pub fn clamped_asin(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(-1.0, 1.0).asin()
}

/// Wrap an angle into `[-π, π)`.
///
/// # Examples
///
/// ```
/// use std::f64::consts::PI;
/// use vrwheel_geometry::wrap_to_pi;
///
/// assert!((wrap_to_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
/// assert!((wrap_to_pi(0.25) - 0.25).abs() < 1e-12);
/// ```
pub fn wrap_to_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Shift `raw` by the multiple of 2π that lands closest to `previous`.
///
/// The result differs from `previous` by at most π and is congruent to
/// `raw` mod 2π.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::unwrap_toward;
///
/// let prev = 20f64.to_radians();
/// let next = unwrap_toward(prev, 350f64.to_radians());
/// assert!((next.to_degrees() + 10.0).abs() < 1e-9);
/// ```
pub fn unwrap_toward(previous: f64, raw: f64) -> f64 {
    if !raw.is_finite() {
        return previous;
    }
    previous + wrap_to_pi(raw - previous)
}

/// Fixed-length history of committed (unwrapped) angles, oldest first.
///
/// Always holds at least two samples so that a velocity is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl AngleHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let mut samples = VecDeque::with_capacity(capacity);
        samples.push_back(0.0);
        samples.push_back(0.0);
        Self { samples, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent committed angle.
    pub fn latest(&self) -> f64 {
        self.samples.back().copied().unwrap_or(0.0)
    }

    /// The sample before [`latest`](Self::latest).
    pub fn previous(&self) -> f64 {
        self.samples
            .iter()
            .rev()
            .nth(1)
            .copied()
            .unwrap_or_else(|| self.latest())
    }

    /// Difference between the last two samples.
    pub fn last_delta(&self) -> f64 {
        self.latest() - self.previous()
    }

    /// Append a sample as-is, evicting the oldest when full.
    pub fn push(&mut self, angle: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(angle);
    }

    /// Append a raw wrapped sample after unwrapping it against the latest.
    pub fn push_unwrapped(&mut self, raw: f64) -> f64 {
        let committed = unwrap_toward(self.latest(), raw);
        self.push(committed);
        committed
    }

    /// Overwrite the latest sample.
    pub fn set_latest(&mut self, angle: f64) {
        if let Some(last) = self.samples.back_mut() {
            *last = angle;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// Reset to a resting angle.
    pub fn reset(&mut self, angle: f64) {
        self.samples.clear();
        self.samples.push_back(angle);
        self.samples.push_back(angle);
    }
}

impl Default for AngleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrwheel_test_helpers::assert_approx_eq;

    #[test]
    fn test_clamped_inverse_trig_never_nan() {
        assert!(!clamped_acos(1.5).is_nan());
        assert!(!clamped_asin(-7.0).is_nan());
        assert_approx_eq!(clamped_acos(f64::NAN), FRAC_PI_2, 1e-12);
        assert_approx_eq!(clamped_asin(f64::NAN), 0.0, 1e-12);
        assert_approx_eq!(clamped_asin(2.0), FRAC_PI_2, 1e-12);
    }

    #[test]
    fn test_wrap_boundaries() {
        assert_approx_eq!(wrap_to_pi(PI), -PI, 1e-12);
        assert_approx_eq!(wrap_to_pi(-PI), -PI, 1e-12);
        assert_approx_eq!(wrap_to_pi(5.0 * TAU + 0.1), 0.1, 1e-9);
    }

    #[test]
    fn test_unwrap_sequence_crosses_zero() {
        let mut hist = AngleHistory::default();
        let out: Vec<f64> = [0.0_f64, 10.0, 20.0, 350.0]
            .iter()
            .map(|d| hist.push_unwrapped(d.to_radians()).to_degrees())
            .collect();
        let expected = [0.0, 10.0, 20.0, -10.0];
        for (got, want) in out.iter().zip(expected) {
            assert_approx_eq!(*got, want, 1e-9);
        }
    }

    #[test]
    fn test_unwrap_counts_full_turns() {
        let mut hist = AngleHistory::default();
        for step in 0..=72 {
            let raw = wrap_to_pi(f64::from(step) * 10f64.to_radians());
            hist.push_unwrapped(raw);
        }
        assert_approx_eq!(hist.latest().to_degrees(), 720.0, 1e-6);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut hist = AngleHistory::new(3);
        for i in 0..10 {
            hist.push(f64::from(i));
        }
        assert_eq!(hist.len(), 3);
        assert_approx_eq!(hist.latest(), 9.0, 1e-12);
        assert_approx_eq!(hist.previous(), 8.0, 1e-12);
        assert_approx_eq!(hist.last_delta(), 1.0, 1e-12);
    }

    #[test]
    fn test_non_finite_raw_keeps_previous() {
        let mut hist = AngleHistory::default();
        hist.push(0.5);
        assert_approx_eq!(hist.push_unwrapped(f64::NAN), 0.5, 1e-12);
    }

    #[test]
    fn test_set_latest_and_reset() {
        let mut hist = AngleHistory::default();
        hist.push(1.0);
        hist.set_latest(2.0);
        assert_approx_eq!(hist.latest(), 2.0, 1e-12);
        hist.reset(0.0);
        assert_eq!(hist.len(), 2);
        assert_approx_eq!(hist.last_delta(), 0.0, 1e-12);
    }
}
