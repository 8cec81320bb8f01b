//! Per-frame magnitude smoothing, history and haptic triggering.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use vrwheel_geometry::rms_of_differences;

use crate::constants::{
    HAPTIC_COOLDOWN, HAPTIC_MIN_RMS, HAPTIC_RMS_GAIN, HISTORY_LEN, SMOOTHING_ALPHA,
};

/// Tuning for [`MagnitudeSynth`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    pub alpha: f64,
    pub history_len: usize,
    pub haptic_min_rms: f64,
    pub haptic_cooldown: Duration,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            alpha: SMOOTHING_ALPHA,
            history_len: HISTORY_LEN,
            haptic_min_rms: HAPTIC_MIN_RMS,
            haptic_cooldown: HAPTIC_COOLDOWN,
        }
    }
}

/// Output of one synthesis step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FfbFrame {
    pub raw: f64,
    pub smoothed: f64,
    /// Haptic intensity in `(0, 1]` when the road-feel trigger fired.
    pub haptic: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MagnitudeSynth {
    config: SynthConfig,
    smoothed: f64,
    history: VecDeque<f64>,
    last_haptic: Option<Instant>,
}

impl MagnitudeSynth {
    pub fn new(config: SynthConfig) -> Self {
        let len = config.history_len.max(2);
        Self {
            config,
            smoothed: 0.0,
            history: std::iter::repeat_n(0.0, len).collect(),
            last_haptic: None,
        }
    }

    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    /// Oldest sample first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Zero the smoothed value and the whole history.
    pub fn reset(&mut self) {
        self.smoothed = 0.0;
        self.history.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn push(&mut self, raw: f64, now: Instant) -> FfbFrame {
        let raw = if raw.is_finite() { raw } else { 0.0 };
        let a = self.config.alpha;
        self.smoothed = a * raw + (1.0 - a) * self.smoothed;
        if self.history.len() >= self.config.history_len.max(2) {
            self.history.pop_front();
        }
        self.history.push_back(self.smoothed);

        FfbFrame {
            raw,
            smoothed: self.smoothed,
            haptic: self.haptic_trigger(now),
        }
    }

    fn haptic_trigger(&mut self, now: Instant) -> Option<f64> {
        let rms = rms_of_differences(self.history.iter().copied());
        if rms < self.config.haptic_min_rms {
            return None;
        }
        if let Some(last) = self.last_haptic
            && now.saturating_duration_since(last) < self.config.haptic_cooldown
        {
            return None;
        }
        self.last_haptic = Some(now);
        Some((rms * HAPTIC_RMS_GAIN).clamp(0.0, 1.0))
    }
}

impl Default for MagnitudeSynth {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrwheel_test_helpers::assert_approx_eq;

    #[test]
    fn test_smoothing_is_geometric() {
        let now = Instant::now();
        let mut synth = MagnitudeSynth::default();
        let f1 = synth.push(1.0, now);
        assert_approx_eq!(f1.smoothed, 0.3, 1e-12);
        let f2 = synth.push(1.0, now);
        assert_approx_eq!(f2.smoothed, 0.51, 1e-12);
    }

    #[test]
    fn test_history_newest_last() {
        let now = Instant::now();
        let mut synth = MagnitudeSynth::default();
        synth.push(1.0, now);
        let hist: Vec<f64> = synth.history().collect();
        assert_eq!(hist.len(), HISTORY_LEN);
        assert_approx_eq!(hist.first().copied().unwrap_or(f64::NAN), 0.0, 1e-12);
        assert_approx_eq!(hist.last().copied().unwrap_or(f64::NAN), 0.3, 1e-12);
    }

    #[test]
    fn test_steady_signal_never_triggers_haptics() {
        let t0 = Instant::now();
        let mut synth = MagnitudeSynth::default();
        synth.reset();
        for i in 0..20u64 {
            let frame = synth.push(0.0, t0 + Duration::from_millis(i * 16));
            assert!(frame.haptic.is_none());
        }
    }

    #[test]
    fn test_haptic_cooldown() {
        let t0 = Instant::now();
        let mut synth = MagnitudeSynth::default();
        let first = synth.push(1.0, t0);
        assert!(first.haptic.is_some());
        let within = synth.push(-1.0, t0 + Duration::from_millis(50));
        assert!(within.haptic.is_none());
        let after = synth.push(1.0, t0 + Duration::from_millis(150));
        assert!(after.haptic.is_some());
    }

    #[test]
    fn test_reset_zeroes_history() {
        let now = Instant::now();
        let mut synth = MagnitudeSynth::default();
        synth.push(1.0, now);
        synth.reset();
        assert_approx_eq!(synth.smoothed(), 0.0, 1e-12);
        assert!(synth.history().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_non_finite_raw_is_zero() {
        let mut synth = MagnitudeSynth::default();
        let frame = synth.push(f64::NAN, Instant::now());
        assert_approx_eq!(frame.smoothed, 0.0, 1e-12);
    }
}
