//! Settings validation

use vrwheel_errors::ValidationError;
use vrwheel_shifter::ReverseCorner;

use crate::types::SimConfig;

const REVERSE_CHOICES: &str = "Top Left, Bottom Left, Top Right, Bottom Right";

fn check_point(errors: &mut Vec<ValidationError>, field: &str, point: &[f64; 3]) {
    if point.iter().any(|v| !v.is_finite()) {
        errors.push(ValidationError::not_finite(field));
    }
}

fn check_f64(errors: &mut Vec<ValidationError>, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::not_finite(field));
    } else if !(min..=max).contains(&value) {
        errors.push(ValidationError::out_of_range(field, value, min, max));
    }
}

fn check_u32(errors: &mut Vec<ValidationError>, field: &str, value: u32, min: u32, max: u32) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::out_of_range(field, value, min, max));
    }
}

/// Every problem in `config`, empty when it is usable.
pub fn validate_config(config: &SimConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let general = &config.general;
    check_u32(&mut errors, "haptic_intensity", general.haptic_intensity, 0, 100);
    check_u32(&mut errors, "axis_deadzone", general.axis_deadzone, 0, 95);

    let wheel = &config.wheel;
    check_point(&mut errors, "wheel_center", &wheel.center);
    check_f64(&mut errors, "wheel_size", wheel.size, 0.05, 2.0);
    check_u32(&mut errors, "wheel_degrees", wheel.degrees, 90, 3600);
    check_u32(&mut errors, "wheel_centerforce", wheel.centerforce, 0, 1000);
    check_u32(&mut errors, "wheel_alpha", wheel.alpha, 0, 100);
    check_f64(&mut errors, "wheel_pitch", wheel.pitch, -90.0, 90.0);

    let shifter = &config.shifter;
    check_point(&mut errors, "shifter_center", &shifter.center);
    check_f64(&mut errors, "shifter_degree", shifter.degree, 1.0, 45.0);
    check_u32(&mut errors, "shifter_scale", shifter.scale, 10, 500);
    if shifter.reverse_orientation.parse::<ReverseCorner>().is_err() {
        errors.push(ValidationError::invalid_enum(
            "shifter_reverse_orientation",
            shifter.reverse_orientation.clone(),
            REVERSE_CHOICES,
        ));
    }

    let bike = &config.bike;
    check_point(&mut errors, "bike_center", &bike.center);
    check_f64(&mut errors, "bike_max_lean", bike.max_lean, 1.0, 89.0);
    check_f64(&mut errors, "bike_handlebar_height", bike.handlebar_height, 10.0, 300.0);

    errors
}

impl SimConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_config(self)
    }
}
