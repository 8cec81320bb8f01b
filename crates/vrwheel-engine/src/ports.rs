//! Boundaries between the frame loop and the outside world.

use serde::{Deserialize, Serialize};
use vrwheel_errors::VrWheelError;
use vrwheel_shifter::{GearChange, ShiftDirection, ShifterSnapshot};

use crate::bike::BikeSnapshot;
use crate::grab::Attachment;
use crate::pose::{Hand, PoseFrame};
use crate::wheel::WheelSnapshot;

/// HID usage ids for the virtual controller's axes.
pub mod axes {
    pub const X: u8 = 0x30;
    pub const Y: u8 = 0x31;
    pub const Z: u8 = 0x32;
    pub const RX: u8 = 0x33;
    pub const RY: u8 = 0x34;
    pub const SLIDER_0: u8 = 0x36;
    pub const SLIDER_1: u8 = 0x37;
}

/// Button held while the wheel is pinned at its rotation limit.
pub const WHEEL_LIMIT_BUTTON: u8 = 61;

/// Supplies tracking samples. Polled once per frame, never blocks.
pub trait PoseSource {
    /// `None` when no new frame is available; the loop reuses the last one.
    fn poll(&mut self) -> Option<PoseFrame>;

    /// The failure that ended the stream, if any. Reported once.
    fn take_error(&mut self) -> Option<VrWheelError> {
        None
    }
}

/// The virtual joystick the simulator reads.
pub trait VirtualControllerSink {
    /// `value` in `[0, 0x8000]`.
    fn set_axis(&mut self, axis: u8, value: i32);
    fn set_button(&mut self, button: u8, pressed: bool);
}

/// Fire-and-forget signals for haptics and audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Feedback {
    /// Vibrate one controller for `micros` microseconds.
    HapticPulse { hand: Hand, micros: u16 },
    GearChanged(GearChange),
    SequentialShift(ShiftDirection),
    /// The wheel just hit its rotation limit.
    WheelLimit,
    /// FFB-derived road texture, intensity in `(0, 1]`.
    RoadFeel { intensity: f64 },
    EditMode { active: bool },
}

pub trait FeedbackSink {
    fn send(&mut self, feedback: Feedback);
}

/// Read-only view of one frame for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub wheel: WheelSnapshot,
    pub bike: Option<BikeSnapshot>,
    pub shifter: ShifterSnapshot,
    pub attachments: [Attachment; 2],
    pub edit_mode: bool,
    /// Wheel image opacity, percent.
    pub alpha: u32,
}

pub trait RenderSink {
    fn render(&mut self, snapshot: &RenderSnapshot);
}

impl<T: VirtualControllerSink + ?Sized> VirtualControllerSink for &mut T {
    fn set_axis(&mut self, axis: u8, value: i32) {
        (**self).set_axis(axis, value);
    }

    fn set_button(&mut self, button: u8, pressed: bool) {
        (**self).set_button(button, pressed);
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for &mut T {
    fn send(&mut self, feedback: Feedback) {
        (**self).send(feedback);
    }
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        (**self).render(snapshot);
    }
}

impl<T: PoseSource + ?Sized> PoseSource for Box<T> {
    fn poll(&mut self) -> Option<PoseFrame> {
        (**self).poll()
    }
}
