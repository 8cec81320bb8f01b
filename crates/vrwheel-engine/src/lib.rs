//! Hand-tracked control surfaces driven at a fixed frame rate.
//!
//! Each frame the [`FrameEngine`] takes a [`PoseFrame`], decides which hand
//! holds the wheel or the shifter, advances the [`WheelTracker`] (or the
//! [`BikeTracker`] in handlebar mode) and the shifter, and writes the
//! results to a [`VirtualControllerSink`]. Haptic and audio requests go to a
//! [`FeedbackSink`]; a read-only [`RenderSnapshot`] goes to a [`RenderSink`].
//!
//! Force feedback arrives on the driver's own thread and is shared through
//! [`vrwheel_ffb::FfbHandle`]; everything else is owned by the frame loop.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod bike;
pub mod edit;
pub mod frame;
pub mod grab;
pub mod pad;
pub mod ports;
pub mod pose;
pub mod scheduler;
pub mod sinks;
pub mod wheel;

pub use bike::{BikeOutput, BikeSnapshot, BikeTracker};
pub use edit::{EditMode, EditOutcome};
pub use frame::{
    ControlMode, FrameEngine, FrameReport, SHIFTER_TOUCH_PULSE_MICROS, shifter_config,
};
pub use grab::{
    Attachment, AttachmentChange, AttachmentMachine, AutoEnvelope, GrabEvent, GrabMode,
    GripDetector, Reach, TripleGrip,
};
pub use pad::{ControlBinding, StickBinding, VirtualPad, touchpad_zone};
pub use ports::{
    Feedback, FeedbackSink, PoseSource, RenderSink, RenderSnapshot, VirtualControllerSink,
    WHEEL_LIMIT_BUTTON, axes,
};
pub use pose::{Axis2, ButtonEdges, Hand, HandPose, HeadPose, PoseFrame, buttons};
pub use scheduler::{DEFAULT_RATE_HZ, FrameScheduler, FrameStats, FrameTick};
pub use sinks::{
    ChannelFeedback, LatestRender, MemoryController, NullRender, RecordingFeedback, ScriptedPoses,
};
pub use wheel::{WheelInput, WheelOutput, WheelParams, WheelSnapshot, WheelTracker};

use thiserror::Error;
use vrwheel_errors::{ValidationError, VrWheelError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Frame rate must be a positive number of hertz, got {0}")]
    InvalidRate(f64),

    #[error("Unknown control mode '{0}' (expected wheel or bike)")]
    UnknownMode(String),

    #[error("Configuration has {} invalid value(s)", .0.len())]
    InvalidConfig(Vec<ValidationError>),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for VrWheelError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidConfig(mut errors) if errors.len() == 1 => match errors.pop() {
                Some(e) => VrWheelError::Validation(e),
                None => VrWheelError::Config(String::new()),
            },
            other => VrWheelError::Config(other.to_string()),
        }
    }
}
