//! One synchronous frame: poses in, controller writes and signals out.

use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;
use vrwheel_config::{ShifterSettings, SimConfig};
use vrwheel_ffb::{FfbFrame, FfbHandle};
use vrwheel_geometry::Vec3;
use vrwheel_shifter::{
    Gear, Shifter, ShifterConfig, ShifterEvent, ShifterInput, StickGeometry,
};

use crate::bike::BikeTracker;
use crate::edit::EditMode;
use crate::grab::{
    Attachment, AttachmentChange, AttachmentMachine, AutoEnvelope, EDIT_PULSE_MICROS,
    GRAB_PULSE_MICROS, GrabEvent, GrabMode, GripDetector, Reach, TripleGrip,
};
use crate::pad::VirtualPad;
use crate::ports::{
    Feedback, FeedbackSink, RenderSink, RenderSnapshot, VirtualControllerSink,
    WHEEL_LIMIT_BUTTON, axes,
};
use crate::pose::{ButtonEdges, Hand, PoseFrame, buttons};
use crate::wheel::{LIMIT_PULSE_MICROS, WheelInput, WheelOutput, WheelParams, WheelTracker};
use crate::{EngineError, EngineResult};

/// Pulse on the right hand when it first touches the shifter stick.
pub const SHIFTER_TOUCH_PULSE_MICROS: u16 = 500;

/// Which control surface the hands drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Wheel,
    Bike,
}

impl FromStr for ControlMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wheel" => Ok(ControlMode::Wheel),
            "bike" => Ok(ControlMode::Bike),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}

/// What happened during one [`FrameEngine::tick`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    pub index: u64,
    pub changes: Vec<AttachmentChange>,
    pub attachments: [Attachment; 2],
    pub wheel: WheelOutput,
    pub lean_deg: Option<f64>,
    pub gear: Option<Gear>,
    pub ffb: Option<FfbFrame>,
    pub edit_mode: bool,
}

/// Per-frame inputs derived before any tracker runs.
#[derive(Debug, Clone, Copy)]
struct FrameInput<'a> {
    frame: &'a PoseFrame,
    now: Instant,
    edges: [ButtonEdges; 2],
    grip_edges: [Option<bool>; 2],
}

/// Map persisted shifter settings onto the stick model.
pub fn shifter_config(settings: &ShifterSettings) -> ShifterConfig {
    ShifterConfig {
        geometry: StickGeometry {
            origin: Vec3::from_array(settings.center),
            tilt_deg: settings.degree,
            scale: f64::from(settings.scale) / 100.0,
            ..StickGeometry::default()
        },
        reverse: settings.reverse_corner(),
        sequential: settings.sequential,
        ..ShifterConfig::default()
    }
}

fn grab_mode(config: &SimConfig) -> GrabMode {
    if config.wheel.grabbed_by_grip {
        GrabMode::Manual(config.wheel.grip_mode())
    } else {
        GrabMode::Automatic
    }
}

/// Owns every tracker and runs them in a fixed order each frame.
///
/// ```
/// use std::time::Instant;
/// use vrwheel_config::SimConfig;
/// use vrwheel_engine::{ControlMode, FrameEngine, MemoryController, NullRender, PoseFrame,
///     RecordingFeedback, axes};
///
/// let mut engine = FrameEngine::new(SimConfig::default(), ControlMode::Wheel)?;
/// let mut controller = MemoryController::new();
/// let report = engine.tick(
///     &PoseFrame::default(),
///     Instant::now(),
///     &mut controller,
///     &mut RecordingFeedback::new(),
///     &mut NullRender,
/// );
/// assert_eq!(report.index, 0);
/// assert_eq!(controller.axis(axes::X), Some(0x4000));
/// # Ok::<(), vrwheel_engine::EngineError>(())
/// ```
#[derive(Debug)]
pub struct FrameEngine {
    config: SimConfig,
    mode: ControlMode,
    attachments: AttachmentMachine,
    grips: GripDetector,
    envelope: AutoEnvelope,
    triple: TripleGrip,
    wheel: WheelTracker,
    bike: BikeTracker,
    shifter: Shifter,
    pad: VirtualPad,
    edit: EditMode,
    ffb: Option<FfbHandle>,
    pending: Vec<GrabEvent>,
    previous: PoseFrame,
    right_on_shifter: bool,
    frame_index: u64,
}

impl FrameEngine {
    /// Build the trackers from a configuration, which must validate.
    pub fn new(config: SimConfig, mode: ControlMode) -> EngineResult<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(EngineError::InvalidConfig(errors));
        }
        Ok(Self {
            attachments: AttachmentMachine::new(grab_mode(&config)),
            grips: GripDetector::default(),
            envelope: AutoEnvelope::default(),
            triple: TripleGrip::default(),
            wheel: WheelTracker::new(WheelParams::from_settings(&config.wheel)),
            bike: BikeTracker::new(&config.bike),
            shifter: Shifter::new(shifter_config(&config.shifter)),
            pad: VirtualPad::new(&config.general),
            edit: EditMode::default(),
            ffb: None,
            pending: Vec::new(),
            previous: PoseFrame::default(),
            right_on_shifter: false,
            frame_index: 0,
            config,
            mode,
        })
    }

    /// Drive centering from a shared FFB state. Ignored while FFB is off in
    /// the configuration.
    pub fn with_ffb(mut self, handle: FfbHandle) -> Self {
        self.ffb = Some(handle);
        self
    }

    /// Settings including anything changed in edit mode.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn wheel(&self) -> &WheelTracker {
        &self.wheel
    }

    pub fn bike(&self) -> &BikeTracker {
        &self.bike
    }

    pub fn shifter(&self) -> &Shifter {
        &self.shifter
    }

    pub fn attachment(&self, hand: Hand) -> Attachment {
        self.attachments.state(hand)
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_active()
    }

    /// Queue a grab or release for the controller with `device_id`; applied
    /// on the next tick. Returns `false` for ids not seen last frame.
    pub fn submit(&mut self, device_id: u32, attach: bool, auto: bool) -> bool {
        let Some(hand) = self.previous.hand_for_device(device_id) else {
            trace!(device_id, "grab event for unknown device dropped");
            return false;
        };
        self.pending.push(GrabEvent { hand, attach, auto });
        true
    }

    fn reach(&self, hand: Hand, frame: &PoseFrame) -> Reach {
        let pose = frame.hand(hand);
        if !pose.valid {
            return Reach::default();
        }
        match self.mode {
            ControlMode::Wheel => Reach {
                shifter: self.shifter.contains(pose.position),
                wheel: self.wheel.within_reach(pose.position),
            },
            ControlMode::Bike => Reach {
                shifter: false,
                wheel: true,
            },
        }
    }

    fn pulse<F: FeedbackSink + ?Sized>(&self, feedback: &mut F, hand: Hand, micros: u16) {
        let scaled = (f64::from(micros) * self.config.general.haptic_scale()).round() as i64;
        if scaled >= 1 {
            feedback.send(Feedback::HapticPulse {
                hand,
                micros: u16::try_from(scaled).unwrap_or(u16::MAX),
            });
        }
    }

    fn on_change<F: FeedbackSink + ?Sized>(
        &mut self,
        change: AttachmentChange,
        frame: &PoseFrame,
        feedback: &mut F,
    ) {
        if change.from == Attachment::Shifter {
            self.shifter.release();
        }
        if change.to == Attachment::Shifter {
            let pose = frame.hand(change.hand);
            self.shifter.grab(pose.position, frame.head.orientation.yaw);
        }
        if change.is_manual_attach() {
            self.pulse(feedback, change.hand, GRAB_PULSE_MICROS);
        }
    }

    fn apply_event<F: FeedbackSink + ?Sized>(
        &mut self,
        event: GrabEvent,
        frame: &PoseFrame,
        feedback: &mut F,
        report: &mut FrameReport,
    ) {
        let reach = self.reach(event.hand, frame);
        if let Some(change) = self.attachments.apply(event, reach) {
            self.on_change(change, frame, feedback);
            report.changes.push(change);
        }
    }

    fn enter_edit<F: FeedbackSink + ?Sized>(
        &mut self,
        now: Instant,
        feedback: &mut F,
        report: &mut FrameReport,
    ) {
        for change in self.attachments.release_all() {
            if change.from == Attachment::Shifter {
                self.shifter.release();
            }
            report.changes.push(change);
        }
        self.edit.enter(now);
        for hand in Hand::ALL {
            self.pulse(feedback, hand, EDIT_PULSE_MICROS);
        }
        feedback.send(Feedback::EditMode { active: true });
    }

    /// Run one frame. Never fails; every path has a fallback value.
    pub fn tick<C, F, R>(
        &mut self,
        frame: &PoseFrame,
        now: Instant,
        controller: &mut C,
        feedback: &mut F,
        render: &mut R,
    ) -> FrameReport
    where
        C: VirtualControllerSink + ?Sized,
        F: FeedbackSink + ?Sized,
        R: RenderSink + ?Sized,
    {
        let edges = [
            ButtonEdges::between(&self.previous.left, &frame.left),
            ButtonEdges::between(&self.previous.right, &frame.right),
        ];
        let grip_edges = Hand::ALL.map(|h| self.grips.update(h, frame.hand(h)));
        let mut report = FrameReport {
            index: self.frame_index,
            ..FrameReport::default()
        };

        let ffb = match (&self.ffb, self.config.wheel.ffb) {
            (Some(handle), true) => Some(handle.synthesize(now)),
            _ => None,
        };
        report.ffb = ffb;
        if let Some(intensity) = ffb.and_then(|f| f.haptic)
            && self.config.wheel.ffb_haptic
        {
            feedback.send(Feedback::RoadFeel { intensity });
        }

        if self.edit.is_active() {
            self.pending.clear();
            let out = self.edit.update(
                now,
                &frame.left,
                &frame.right,
                &mut self.wheel,
                &mut self.config.wheel,
            );
            if out.exited {
                feedback.send(Feedback::EditMode { active: false });
            }
        } else {
            let input = FrameInput {
                frame,
                now,
                edges,
                grip_edges,
            };
            self.run_surfaces(&input, &mut report, controller, feedback);
        }

        report.attachments = self.attachments.states();
        report.edit_mode = self.edit.is_active();
        report.gear = self.shifter.gear();
        render.render(&self.snapshot());

        self.previous = *frame;
        self.frame_index = self.frame_index.saturating_add(1);
        report
    }

    fn run_surfaces<C, F>(
        &mut self,
        input: &FrameInput<'_>,
        report: &mut FrameReport,
        controller: &mut C,
        feedback: &mut F,
    ) where
        C: VirtualControllerSink + ?Sized,
        F: FeedbackSink + ?Sized,
    {
        let FrameInput {
            frame,
            now,
            edges,
            grip_edges,
        } = *input;
        self.pad.update(frame, &edges, controller);

        for event in std::mem::take(&mut self.pending) {
            self.apply_event(event, frame, feedback, report);
        }

        for (hand, edge) in Hand::ALL.into_iter().zip(grip_edges) {
            let Some(pressed) = edge else {
                continue;
            };
            if pressed && self.mode == ControlMode::Wheel && self.triple.press(hand, now) {
                self.enter_edit(now, feedback, report);
                return;
            }
            let reach = self.reach(hand, frame);
            if let Some(change) = self.attachments.grip(hand, pressed, reach) {
                self.on_change(change, frame, feedback);
                report.changes.push(change);
            }
        }

        if self.attachments.mode() == GrabMode::Automatic && self.mode == ControlMode::Wheel {
            for hand in Hand::ALL {
                let pose = frame.hand(hand);
                let inside = pose.valid && self.wheel.in_envelope(pose.position);
                if let Some(event) = self.envelope.update(hand, inside) {
                    self.apply_event(event, frame, feedback, report);
                }
            }
        }

        let holders = Hand::ALL.map(|h| {
            self.attachments
                .state(h)
                .is_wheel()
                .then(|| frame.hand(h).position)
        });

        match self.mode {
            ControlMode::Wheel => {
                let input = WheelInput {
                    holders,
                    unsnap: self.attachments.mode() == GrabMode::Automatic,
                    ffb: report.ffb.map(|f| f.smoothed),
                };
                let out = self.wheel.update(&input);
                controller.set_axis(axes::X, out.axis);
                controller.set_button(WHEEL_LIMIT_BUTTON, out.limit_hit);
                if out.limit_hit {
                    for hand in Hand::ALL {
                        if self.attachments.state(hand).is_wheel() {
                            self.pulse(feedback, hand, LIMIT_PULSE_MICROS);
                        }
                    }
                }
                if out.newly_pinned {
                    feedback.send(Feedback::WheelLimit);
                }
                report.wheel = out;
                self.run_shifter(frame, &edges, controller, feedback);
            }
            ControlMode::Bike => {
                let [left, right] = holders;
                let out = self.bike.update(left, right);
                controller.set_axis(axes::X, out.axis);
                report.lean_deg = Some(out.lean_deg);
            }
        }
    }

    fn run_shifter<C, F>(
        &mut self,
        frame: &PoseFrame,
        edges: &[ButtonEdges; 2],
        controller: &mut C,
        feedback: &mut F,
    ) where
        C: VirtualControllerSink + ?Sized,
        F: FeedbackSink + ?Sized,
    {
        let right = frame.hand(Hand::Right);
        let touching = right.valid && self.shifter.contains(right.position);
        if touching && !self.right_on_shifter {
            self.pulse(feedback, Hand::Right, SHIFTER_TOUCH_PULSE_MICROS);
        }
        self.right_on_shifter = touching;

        let input = match self.attachments.shifter_holder() {
            Some(hand) => {
                let pose = frame.hand(hand);
                let e = edges.get(hand.index()).copied().unwrap_or_default();
                ShifterInput {
                    hand: pose.position,
                    trigger: pose.trigger,
                    splitter_pressed: e.pressed(buttons::A),
                    range_pressed: e.pressed(buttons::MENU),
                }
            }
            None => ShifterInput::default(),
        };
        let update = self.shifter.update(&input);
        for event in update.events() {
            match event {
                ShifterEvent::GearChanged(change) => {
                    feedback.send(Feedback::GearChanged(change));
                }
                ShifterEvent::Sequential(direction) => {
                    feedback.send(Feedback::SequentialShift(direction));
                }
                ShifterEvent::SplitterToggled(_) | ShifterEvent::RangeToggled(_) => {}
            }
        }
        for (button, pressed) in self.shifter.buttons().iter() {
            controller.set_button(button, pressed);
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            frame: self.frame_index,
            wheel: self.wheel.snapshot(),
            bike: (self.mode == ControlMode::Bike).then(|| self.bike.snapshot()),
            shifter: self.shifter.snapshot(),
            attachments: self.attachments.states(),
            edit_mode: self.edit.is_active(),
            alpha: self.config.wheel.alpha,
        }
    }
}
