//! Scalar shaping: dead bands and short-window statistics.

/// Zero inside `[-dead, dead]`, rescaled so the remaining travel still
/// reaches ±1.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::dead_and_stretch;
///
/// assert!(dead_and_stretch(0.1, 0.2).abs() < 1e-12);
/// assert!((dead_and_stretch(1.0, 0.2) - 1.0).abs() < 1e-12);
/// assert!((dead_and_stretch(-0.6, 0.2) + 0.5).abs() < 1e-12);
/// ```
pub fn dead_and_stretch(value: f64, dead: f64) -> f64 {
    let dead = dead.clamp(0.0, 0.999);
    if !value.is_finite() || value.abs() < dead {
        return 0.0;
    }
    (value - value.signum() * dead) / (1.0 - dead)
}

/// Root-mean-square of consecutive differences of `samples`.
///
/// Returns 0 for fewer than two samples.
pub fn rms_of_differences<I>(samples: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut prev: Option<f64> = None;
    let mut sum = 0.0;
    let mut count = 0u32;
    for s in samples {
        if let Some(p) = prev {
            let d = s - p;
            sum += d * d;
            count = count.saturating_add(1);
        }
        prev = Some(s);
    }
    if count == 0 {
        return 0.0;
    }
    (sum / f64::from(count)).sqrt()
}

/// Map `[0, 1]` onto the controller's axis range `[0, 0x8000]`.
pub fn unit_to_axis(value: f64) -> i32 {
    let v = if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    };
    (v * 32768.0).round() as i32
}
