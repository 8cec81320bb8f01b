//! Effect kinds, parameters and per-kind magnitude evaluation.

use std::f64::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vrwheel_errors::DecodeError;

use crate::constants::{DURATION_INFINITE, MAGNITUDE_SCALE, MAX_GAIN};

/// Effect kinds as numbered by the feedback channel.
///
/// # Examples
///
/// ```
/// use vrwheel_ffb::EffectType;
///
/// assert_eq!(EffectType::try_from(1u8), Ok(EffectType::Constant));
/// assert!(EffectType::Spring.is_condition());
/// assert!(EffectType::try_from(13u8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EffectType {
    #[default]
    None,
    Constant,
    Ramp,
    Square,
    Sine,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    Spring,
    Damper,
    Inertia,
    Friction,
    Custom,
}

impl EffectType {
    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            EffectType::Square
                | EffectType::Sine
                | EffectType::Triangle
                | EffectType::SawtoothUp
                | EffectType::SawtoothDown
        )
    }

    /// Conditions depend on wheel position/velocity, which the host cannot
    /// observe through a hand-held wheel, so they contribute nothing.
    pub fn is_condition(self) -> bool {
        matches!(
            self,
            EffectType::Spring | EffectType::Damper | EffectType::Inertia | EffectType::Friction
        )
    }
}

impl TryFrom<u8> for EffectType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => EffectType::None,
            1 => EffectType::Constant,
            2 => EffectType::Ramp,
            3 => EffectType::Square,
            4 => EffectType::Sine,
            5 => EffectType::Triangle,
            6 => EffectType::SawtoothUp,
            7 => EffectType::SawtoothDown,
            8 => EffectType::Spring,
            9 => EffectType::Damper,
            10 => EffectType::Inertia,
            11 => EffectType::Friction,
            12 => EffectType::Custom,
            other => {
                return Err(DecodeError::InvalidField {
                    field: "effect_type",
                    value: i64::from(other),
                });
            }
        })
    }
}

/// Direction carried by an effect report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectDirection {
    /// 0x00..=0xFF spans 0..360 degrees
    Polar(u8),
    /// Two's-complement components; positive x is right, positive y is down
    Cartesian { x: i8, y: i8 },
}

impl Default for EffectDirection {
    fn default() -> Self {
        EffectDirection::Polar(0)
    }
}

/// Parameters from an effect report.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vrwheel_ffb::{EffectParams, EffectType};
///
/// let params = EffectParams::new(EffectType::Sine, 500).with_gain(128);
/// assert_eq!(params.duration(), Some(Duration::from_millis(500)));
/// assert!((params.gain_coefficient() - 128.0 / 255.0).abs() < 1e-12);
///
/// let forever = EffectParams::new(EffectType::Constant, 0xFFFF);
/// assert_eq!(forever.duration(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectParams {
    pub effect_type: EffectType,
    /// Milliseconds; [`DURATION_INFINITE`] means no end
    pub duration_ms: u16,
    pub trigger_repeat_ms: u16,
    pub sample_period_ms: u16,
    pub gain: u8,
    pub trigger_button: u8,
    pub direction: EffectDirection,
}

impl EffectParams {
    pub fn new(effect_type: EffectType, duration_ms: u16) -> Self {
        Self {
            effect_type,
            duration_ms,
            trigger_repeat_ms: 0,
            sample_period_ms: 0,
            gain: MAX_GAIN,
            trigger_button: 0xFF,
            direction: EffectDirection::default(),
        }
    }

    pub fn with_gain(mut self, gain: u8) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_direction(mut self, direction: EffectDirection) -> Self {
        self.direction = direction;
        self
    }

    /// `None` for the infinite sentinel.
    pub fn duration(&self) -> Option<Duration> {
        if self.duration_ms == DURATION_INFINITE {
            None
        } else {
            Some(Duration::from_millis(u64::from(self.duration_ms)))
        }
    }

    pub fn gain_coefficient(&self) -> f64 {
        f64::from(self.gain) / f64::from(MAX_GAIN)
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self::new(EffectType::None, DURATION_INFINITE)
    }
}

/// Periodic waveform parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodicParams {
    pub magnitude: u16,
    pub offset: i16,
    /// Hundredths of a degree
    pub phase: u16,
    pub period_ms: u16,
}

impl PeriodicParams {
    /// Value at `elapsed` for the given waveform, scaled to force units.
    pub fn sample(&self, waveform: EffectType, elapsed: Duration) -> f64 {
        let cycles = if self.period_ms == 0 {
            0.0
        } else {
            elapsed.as_secs_f64() * 1000.0 / f64::from(self.period_ms)
        };
        let cycle = (cycles + f64::from(self.phase) / 36_000.0).rem_euclid(1.0);
        let wave = match waveform {
            EffectType::Square => {
                if cycle < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            EffectType::Triangle => {
                if cycle < 0.5 {
                    -1.0 + 4.0 * cycle
                } else {
                    3.0 - 4.0 * cycle
                }
            }
            EffectType::SawtoothUp => -1.0 + 2.0 * cycle,
            EffectType::SawtoothDown => 1.0 - 2.0 * cycle,
            _ => (TAU * cycle).sin(),
        };
        (f64::from(self.offset) + f64::from(self.magnitude) * wave) / MAGNITUDE_SCALE
    }
}

/// Ramp endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RampParams {
    pub start: i16,
    pub end: i16,
}

impl RampParams {
    /// Linear interpolation over `duration`; an open-ended ramp holds `start`.
    pub fn sample(&self, elapsed: Duration, duration: Option<Duration>) -> f64 {
        let frac = match duration {
            Some(d) if !d.is_zero() => (elapsed.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        };
        let start = f64::from(self.start);
        let end = f64::from(self.end);
        (start + (end - start) * frac) / MAGNITUDE_SCALE
    }
}

/// The most recent kind-specific parameter block for an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectPayload {
    Constant(i16),
    Ramp(RampParams),
    Periodic(PeriodicParams),
}

/// Evaluate one effect's own magnitude (before any gain).
///
/// Effects whose kind was never announced are evaluated from whichever
/// payload arrived.
pub fn effect_magnitude(
    params: Option<&EffectParams>,
    payload: Option<&EffectPayload>,
    elapsed: Duration,
) -> f64 {
    let kind = params.map(|p| p.effect_type).unwrap_or_default();
    if kind.is_condition() || kind == EffectType::Custom {
        return 0.0;
    }
    match payload {
        Some(EffectPayload::Constant(m)) => f64::from(*m) / MAGNITUDE_SCALE,
        Some(EffectPayload::Ramp(r)) => r.sample(elapsed, params.and_then(|p| p.duration())),
        Some(EffectPayload::Periodic(p)) => p.sample(kind, elapsed),
        None => 0.0,
    }
}
