//! In-headset wheel placement.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use vrwheel_config::WheelSettings;
use vrwheel_geometry::Vec3;

use crate::pose::{HandPose, buttons};
use crate::wheel::WheelTracker;

pub const ALPHA_STEP: u32 = 10;
pub const ALPHA_REPEAT: Duration = Duration::from_millis(200);
/// Grip presses right after entry do not count as "done".
pub const EXIT_DELAY: Duration = Duration::from_millis(500);
pub const MIN_WHEEL_SIZE: f64 = 0.05;
pub const MAX_WHEEL_SIZE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOutcome {
    pub moved: bool,
    pub alpha_changed: bool,
    pub exited: bool,
}

/// Right-hand controls while editing, checked in this order; only the first
/// held one acts each frame.
#[derive(Debug, Clone, Default)]
pub struct EditMode {
    entered: Option<Instant>,
    last_alpha: Option<Instant>,
}

impl EditMode {
    pub fn is_active(&self) -> bool {
        self.entered.is_some()
    }

    pub fn enter(&mut self, now: Instant) {
        info!("edit mode on");
        self.entered = Some(now);
    }

    pub fn exit(&mut self) {
        if self.entered.take().is_some() {
            info!("edit mode off");
        }
    }

    pub fn update(
        &mut self,
        now: Instant,
        left: &HandPose,
        right: &HandPose,
        wheel: &mut WheelTracker,
        settings: &mut WheelSettings,
    ) -> EditOutcome {
        let mut out = EditOutcome::default();
        let Some(entered) = self.entered else {
            return out;
        };

        if right.is_pressed(buttons::MENU) {
            let due = self
                .last_alpha
                .is_none_or(|t| now.saturating_duration_since(t) > ALPHA_REPEAT);
            if due {
                self.last_alpha = Some(now);
                settings.alpha = next_alpha(settings.alpha);
                debug!(alpha = settings.alpha, "wheel alpha");
                out.alpha_changed = true;
            }
        } else if right.is_pressed(buttons::GRIP) {
            if now.saturating_duration_since(entered) > EXIT_DELAY {
                self.exit();
                out.exited = true;
            }
        } else if right.is_pressed(buttons::A) {
            let mut center = wheel.params().center;
            center.x = 0.0;
            let size = wheel.params().radius * 2.0;
            move_wheel(wheel, settings, center, size);
            out.moved = true;
        } else if right.is_pressed(buttons::TRIGGER) {
            let size = (right.position.distance(left.position) * 2.0)
                .clamp(MIN_WHEEL_SIZE, MAX_WHEEL_SIZE);
            move_wheel(wheel, settings, right.position, size);
            out.moved = true;
        }
        out
    }
}

fn next_alpha(alpha: u32) -> u32 {
    let next = alpha.saturating_add(ALPHA_STEP);
    if next > 100 { 0 } else { next }
}

fn move_wheel(wheel: &mut WheelTracker, settings: &mut WheelSettings, center: Vec3, size: f64) {
    wheel.set_geometry(center, size / 2.0);
    settings.center = center.to_array();
    settings.size = size;
}
