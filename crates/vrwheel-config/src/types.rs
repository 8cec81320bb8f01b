//! Settings sections

use serde::{Deserialize, Serialize};
use vrwheel_shifter::ReverseCorner;

pub const PITCH_MIN_DEG: f64 = -30.0;
pub const PITCH_MAX_DEG: f64 = 90.0;

/// Whole settings file. Sections are flattened so keys stay at top level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(flatten)]
    pub general: GeneralSettings,
    #[serde(flatten)]
    pub wheel: WheelSettings,
    #[serde(flatten)]
    pub shifter: ShifterSettings,
    #[serde(flatten)]
    pub bike: BikeSettings,
}

/// Per-direction "stick as buttons" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickButtons {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Forward trigger touch as a button.
    pub trigger_pre_press_button: bool,
    /// Forward trigger click as a button.
    pub trigger_press_button: bool,
    /// Split the trackpad into five zone buttons.
    pub multibutton_trackpad: bool,
    /// Percent.
    pub haptic_intensity: u32,
    /// Percent of stick travel ignored around center.
    pub axis_deadzone: u32,

    pub j_l_left_button: bool,
    pub j_l_right_button: bool,
    pub j_l_up_button: bool,
    pub j_l_down_button: bool,
    pub j_r_left_button: bool,
    pub j_r_right_button: bool,
    pub j_r_up_button: bool,
    pub j_r_down_button: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            trigger_pre_press_button: false,
            trigger_press_button: false,
            multibutton_trackpad: false,
            haptic_intensity: 100,
            axis_deadzone: 20,
            j_l_left_button: false,
            j_l_right_button: false,
            j_l_up_button: false,
            j_l_down_button: false,
            j_r_left_button: true,
            j_r_right_button: true,
            j_r_up_button: true,
            j_r_down_button: true,
        }
    }
}

impl GeneralSettings {
    pub fn left_stick_buttons(&self) -> StickButtons {
        StickButtons {
            left: self.j_l_left_button,
            right: self.j_l_right_button,
            up: self.j_l_up_button,
            down: self.j_l_down_button,
        }
    }

    pub fn right_stick_buttons(&self) -> StickButtons {
        StickButtons {
            left: self.j_r_left_button,
            right: self.j_r_right_button,
            up: self.j_r_up_button,
            down: self.j_r_down_button,
        }
    }

    pub fn haptic_scale(&self) -> f64 {
        f64::from(self.haptic_intensity) / 100.0
    }

    pub fn deadzone_fraction(&self) -> f64 {
        f64::from(self.axis_deadzone) / 100.0
    }
}

/// How a grip press holds the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripMode {
    /// Press grabs, release lets go.
    Hold,
    /// Each press flips grabbed/free.
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    #[serde(rename = "wheel_center")]
    pub center: [f64; 3],
    /// Diameter, meters.
    #[serde(rename = "wheel_size")]
    pub size: f64,
    /// Manual grabbing with the grip; automatic envelope when false.
    #[serde(rename = "wheel_grabbed_by_grip")]
    pub grabbed_by_grip: bool,
    /// `true` holds while the grip is down, `false` toggles per press.
    #[serde(rename = "wheel_grabbed_by_grip_toggle")]
    pub grabbed_by_grip_toggle: bool,
    /// Full lock-to-lock rotation.
    #[serde(rename = "wheel_degrees")]
    pub degrees: u32,
    /// Percent of the base centering step.
    #[serde(rename = "wheel_centerforce")]
    pub centerforce: u32,
    #[serde(rename = "wheel_alpha")]
    pub alpha: u32,
    #[serde(rename = "wheel_pitch")]
    pub pitch: f64,
    #[serde(rename = "wheel_ffb")]
    pub ffb: bool,
    #[serde(rename = "wheel_ffb_haptic")]
    pub ffb_haptic: bool,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            center: [0.0, -0.4, -0.35],
            size: 0.48,
            grabbed_by_grip: true,
            grabbed_by_grip_toggle: true,
            degrees: 1440,
            centerforce: 100,
            alpha: 100,
            pitch: 0.0,
            ffb: true,
            ffb_haptic: false,
        }
    }
}

impl WheelSettings {
    pub fn grip_mode(&self) -> GripMode {
        if self.grabbed_by_grip_toggle {
            GripMode::Hold
        } else {
            GripMode::Toggle
        }
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShifterSettings {
    #[serde(rename = "shifter_center")]
    pub center: [f64; 3],
    /// Stick tilt at full throw, degrees.
    #[serde(rename = "shifter_degree")]
    pub degree: f64,
    /// Percent.
    #[serde(rename = "shifter_scale")]
    pub scale: u32,
    #[serde(rename = "shifter_sequential")]
    pub sequential: bool,
    #[serde(rename = "shifter_reverse_orientation")]
    pub reverse_orientation: String,
}

impl Default for ShifterSettings {
    fn default() -> Self {
        Self {
            center: [0.25, -0.57, -0.15],
            degree: 6.0,
            scale: 100,
            sequential: false,
            reverse_orientation: ReverseCorner::default().to_string(),
        }
    }
}

impl ShifterSettings {
    /// Parsed reverse corner; unparseable values fall back to the default
    /// (they are reported by validation).
    pub fn reverse_corner(&self) -> ReverseCorner {
        self.reverse_orientation.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BikeSettings {
    #[serde(rename = "bike_center")]
    pub center: [f64; 3],
    /// Degrees.
    #[serde(rename = "bike_max_lean")]
    pub max_lean: f64,
    /// Centimeters above the hands' neutral height.
    #[serde(rename = "bike_handlebar_height")]
    pub handlebar_height: f64,
}

impl Default for BikeSettings {
    fn default() -> Self {
        Self {
            center: [0.0, -0.4, -0.35],
            max_lean: 60.0,
            handlebar_height: 95.0,
        }
    }
}

impl SimConfig {
    /// Clamp values that have a physical range instead of rejecting them.
    /// Returns `true` when something changed.
    pub fn normalize(&mut self) -> bool {
        let pitch = self.wheel.pitch;
        if pitch.is_finite() {
            self.wheel.pitch = pitch.clamp(PITCH_MIN_DEG, PITCH_MAX_DEG);
        }
        (self.wheel.pitch - pitch).abs() > f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_settings() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.wheel.degrees, 1440);
        assert_eq!(cfg.wheel.grip_mode(), GripMode::Hold);
        assert!(cfg.wheel.ffb && !cfg.wheel.ffb_haptic);
        assert_eq!(cfg.shifter.reverse_corner(), ReverseCorner::BottomLeft);
        assert_eq!(cfg.general.axis_deadzone, 20);
        assert_eq!(cfg.general.left_stick_buttons(), StickButtons::default());
        assert!(cfg.general.right_stick_buttons().up);
    }

    #[test]
    fn test_keys_are_flat() -> Result<(), Box<dyn std::error::Error>> {
        let value = serde_json::to_value(SimConfig::default())?;
        assert!(value.get("wheel_size").is_some());
        assert!(value.get("shifter_reverse_orientation").is_some());
        assert!(value.get("bike_max_lean").is_some());
        assert!(value.get("j_r_up_button").is_some());
        assert!(value.get("wheel").is_none());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cfg: SimConfig = serde_json::from_str(r#"{"wheel_size": 0.4, "sfx_volume": 65}"#)?;
        assert!((cfg.wheel.size - 0.4).abs() < 1e-12);
        assert_eq!(cfg.wheel.degrees, 1440);
        assert!((cfg.bike.max_lean - 60.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_integer_values_for_float_keys() -> Result<(), Box<dyn std::error::Error>> {
        let cfg: SimConfig = serde_json::from_str(r#"{"wheel_pitch": 15, "shifter_degree": 8}"#)?;
        assert!((cfg.wheel.pitch - 15.0).abs() < 1e-12);
        assert!((cfg.shifter.degree - 8.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_normalize_clamps_pitch() {
        let mut cfg = SimConfig::default();
        cfg.wheel.pitch = 120.0;
        assert!(cfg.normalize());
        assert!((cfg.wheel.pitch - PITCH_MAX_DEG).abs() < 1e-12);
        assert!(!cfg.normalize());
    }

    #[test]
    fn test_toggle_grip_mode() {
        let wheel = WheelSettings {
            grabbed_by_grip_toggle: false,
            ..WheelSettings::default()
        };
        assert_eq!(wheel.grip_mode(), GripMode::Toggle);
    }
}
