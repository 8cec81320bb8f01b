//! Whole-frame scenarios through `FrameEngine::tick`.

use std::time::{Duration, Instant};

use vrwheel_config::SimConfig;
use vrwheel_engine::{
    Attachment, ControlMode, Feedback, FrameEngine, FrameReport, Hand, HandPose, LatestRender,
    MemoryController, PoseFrame, RecordingFeedback, SHIFTER_TOUCH_PULSE_MICROS,
    WHEEL_LIMIT_BUTTON, axes, buttons,
};
use vrwheel_ffb::{EffectOperation, FfbHandle, FfbReport};
use vrwheel_geometry::Vec3;
use vrwheel_shifter::Gear;
use vrwheel_test_helpers::{assert_approx_eq, ring_point};

const LEFT_ID: u32 = 3;
const RIGHT_ID: u32 = 4;

struct Rig {
    engine: FrameEngine,
    controller: MemoryController,
    feedback: RecordingFeedback,
    render: LatestRender,
    now: Instant,
}

impl Rig {
    fn new(config: SimConfig, mode: ControlMode) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            engine: FrameEngine::new(config, mode)?,
            controller: MemoryController::new(),
            feedback: RecordingFeedback::new(),
            render: LatestRender::default(),
            now: Instant::now(),
        })
    }

    fn tick(&mut self, frame: &PoseFrame) -> FrameReport {
        self.now += Duration::from_millis(16);
        self.engine.tick(
            frame,
            self.now,
            &mut self.controller,
            &mut self.feedback,
            &mut self.render,
        )
    }
}

fn rim(config: &SimConfig, angle_deg: f64) -> Vec3 {
    let w = &config.wheel;
    Vec3::from_array(ring_point(w.center, w.size / 2.0, angle_deg, w.pitch))
}

fn frame(left: Vec3, right: Vec3) -> PoseFrame {
    PoseFrame {
        left: HandPose::at(LEFT_ID, left),
        right: HandPose::at(RIGHT_ID, right),
        ..PoseFrame::default()
    }
}

fn gripping(mut f: PoseFrame, hand: Hand, down: bool) -> PoseFrame {
    f.hand_mut(hand).grip = if down { 1.0 } else { 0.0 };
    f
}

fn pulses(feedback: &mut RecordingFeedback) -> Vec<(Hand, u16)> {
    feedback
        .drain()
        .into_iter()
        .filter_map(|f| match f {
            Feedback::HapticPulse { hand, micros } => Some((hand, micros)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_idle_frame_centers_axis() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = Rig::new(SimConfig::default(), ControlMode::Wheel)?;
    let report = rig.tick(&PoseFrame::default());
    assert_eq!(report.index, 0);
    assert_eq!(rig.controller.axis(axes::X), Some(0x4000));
    assert!(!rig.controller.button(WHEEL_LIMIT_BUTTON));
    assert_eq!(rig.render.frames, 1);
    Ok(())
}

#[test]
fn test_grip_grabs_wheel_with_pulse() -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig::default();
    let mut rig = Rig::new(config.clone(), ControlMode::Wheel)?;
    let far = Vec3::new(0.0, 2.0, 1.0);
    let idle = frame(rim(&config, 180.0), far);
    rig.tick(&idle);

    let report = rig.tick(&gripping(idle, Hand::Left, true));
    assert_eq!(report.attachments, [Attachment::Wheel, Attachment::Free]);
    assert_eq!(pulses(&mut rig.feedback), vec![(Hand::Left, 250)]);

    // Turning the hand around the rim turns the wheel.
    let turned = gripping(frame(rim(&config, 170.0), far), Hand::Left, true);
    let report = rig.tick(&turned);
    assert_approx_eq!(report.wheel.angle.to_degrees(), -10.0, 1e-6);
    assert!(rig.controller.axis(axes::X).unwrap_or_default() > 0x4000);

    // Hold mode: letting go releases without a pulse.
    let report = rig.tick(&gripping(turned, Hand::Left, false));
    assert_eq!(report.attachments, [Attachment::Free, Attachment::Free]);
    assert!(pulses(&mut rig.feedback).is_empty());
    Ok(())
}

#[test]
fn test_grip_far_from_everything_grabs_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = Rig::new(SimConfig::default(), ControlMode::Wheel)?;
    let far = Vec3::new(3.0, 3.0, 3.0);
    let idle = frame(far, far);
    rig.tick(&idle);
    let report = rig.tick(&gripping(idle, Hand::Right, true));
    assert!(report.changes.is_empty());
    assert_eq!(report.attachments, [Attachment::Free; 2]);
    Ok(())
}

#[test]
fn test_shifter_grab_and_gear() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = Rig::new(SimConfig::default(), ControlMode::Wheel)?;
    let knob = rig.engine.shifter().knob();
    let travel = rig.engine.shifter().config().geometry.travel();
    let left = Vec3::new(-2.0, 0.0, 0.0);

    rig.tick(&frame(left, knob));
    let report = rig.tick(&gripping(frame(left, knob), Hand::Right, true));
    assert_eq!(report.attachments[1], Attachment::Shifter);

    let forward = knob + Vec3::new(0.0, 0.0, 0.9 * travel);
    let report = rig.tick(&gripping(frame(left, forward), Hand::Right, true));
    assert_eq!(report.gear, Some(Gear::Third));
    assert!(rig.controller.button(Gear::Third.button()));
    assert!(
        rig.feedback
            .drain()
            .iter()
            .any(|f| matches!(f, Feedback::GearChanged(_)))
    );

    // The gear survives letting go of the stick.
    let report = rig.tick(&frame(left, forward));
    assert_eq!(report.attachments[1], Attachment::Free);
    assert_eq!(report.gear, Some(Gear::Third));
    Ok(())
}

#[test]
fn test_automatic_mode_holds_and_hands_over() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SimConfig::default();
    config.wheel.grabbed_by_grip = false;
    let mut rig = Rig::new(config.clone(), ControlMode::Wheel)?;

    // Both hands on the rim take the wheel without any grip.
    let report = rig.tick(&frame(rim(&config, 180.0), rim(&config, 0.0)));
    assert_eq!(report.attachments, [Attachment::WheelAuto; 2]);
    assert_approx_eq!(report.wheel.angle.to_degrees(), 0.0, 1e-6);
    assert!(pulses(&mut rig.feedback).is_empty());

    let report = rig.tick(&frame(rim(&config, 190.0), rim(&config, 10.0)));
    assert_eq!(report.attachments, [Attachment::WheelAuto; 2]);
    assert_approx_eq!(report.wheel.angle.to_degrees(), 10.0, 1e-6);

    // The left hand leaves the holding envelope; the right keeps steering
    // from where the wheel was.
    let away = Vec3::new(-2.0, 1.0, 1.0);
    let report = rig.tick(&frame(away, rim(&config, 10.0)));
    assert_eq!(report.attachments, [Attachment::Free, Attachment::WheelAuto]);
    assert_approx_eq!(report.wheel.angle.to_degrees(), 10.0, 1e-6);

    let report = rig.tick(&frame(away, rim(&config, 20.0)));
    assert_eq!(report.attachments, [Attachment::Free, Attachment::WheelAuto]);
    assert_approx_eq!(report.wheel.angle.to_degrees(), 20.0, 1e-6);
    Ok(())
}

#[test]
fn test_right_hand_touching_shifter_pulses_once() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = Rig::new(SimConfig::default(), ControlMode::Wheel)?;
    let knob = rig.engine.shifter().knob();
    let far = Vec3::new(-2.0, 2.0, 2.0);

    rig.tick(&frame(far, far));
    assert!(pulses(&mut rig.feedback).is_empty());

    rig.tick(&frame(far, knob));
    assert_eq!(
        pulses(&mut rig.feedback),
        vec![(Hand::Right, SHIFTER_TOUCH_PULSE_MICROS)]
    );

    // Staying on the stick does not buzz again.
    rig.tick(&frame(far, knob));
    assert!(pulses(&mut rig.feedback).is_empty());

    // The left hand does not trigger it.
    rig.tick(&frame(knob, far));
    assert!(pulses(&mut rig.feedback).is_empty());

    rig.tick(&frame(far, knob));
    assert_eq!(pulses(&mut rig.feedback).len(), 1);
    Ok(())
}

#[test]
fn test_triple_grip_enters_edit_mode() -> Result<(), Box<dyn std::error::Error>> {
    let mut rig = Rig::new(SimConfig::default(), ControlMode::Wheel)?;
    let far = Vec3::new(2.0, 2.0, 2.0);
    let open = frame(far, far);
    let closed = gripping(gripping(open, Hand::Left, true), Hand::Right, true);

    let mut entered = false;
    for _ in 0..3 {
        rig.tick(&open);
        entered |= rig.tick(&closed).edit_mode;
    }
    assert!(entered);
    assert!(rig.engine.is_editing());
    let events = rig.feedback.drain();
    assert!(events.contains(&Feedback::EditMode { active: true }));
    assert!(events.contains(&Feedback::HapticPulse {
        hand: Hand::Left,
        micros: 3000
    }));

    // Trigger drags the wheel to the right hand.
    let target = Vec3::new(0.1, -0.3, -0.4);
    let mut placing = frame(Vec3::new(-0.1, -0.3, -0.4), target);
    placing.right = placing.right.with_pressed(buttons::TRIGGER, true);
    rig.tick(&placing);
    let params = rig.engine.wheel().params();
    assert_approx_eq!(params.center.x, 0.1, 1e-12);
    assert_approx_eq!(params.radius, 0.2, 1e-12);
    assert_approx_eq!(rig.engine.config().wheel.size, 0.4, 1e-12);
    Ok(())
}

#[test]
fn test_ffb_drives_centering() -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig::default();
    let ffb = FfbHandle::default();
    let mut rig = Rig::new(config.clone(), ControlMode::Wheel)?;
    rig.engine = FrameEngine::new(config.clone(), ControlMode::Wheel)?.with_ffb(ffb.clone());
    let far = Vec3::new(0.0, 2.0, 1.0);

    rig.tick(&frame(rim(&config, 180.0), far));
    rig.tick(&gripping(frame(rim(&config, 180.0), far), Hand::Left, true));
    let turned = gripping(frame(rim(&config, 150.0), far), Hand::Left, true);
    rig.tick(&turned);
    rig.tick(&turned);
    let held = rig.engine.wheel().angle();
    assert_approx_eq!(held.to_degrees(), -30.0, 1e-6);

    // No force yet: the released wheel stays where it was left.
    let released = frame(rim(&config, 150.0), far);
    for _ in 0..5 {
        rig.tick(&released);
    }
    assert_approx_eq!(rig.engine.wheel().angle(), held, 1e-9);

    ffb.apply(
        &FfbReport::Constant {
            ebi: 1,
            magnitude: 10_000,
        },
        rig.now,
    );
    ffb.apply(
        &FfbReport::Operation {
            ebi: 1,
            op: EffectOperation::Start,
            loop_count: 0,
        },
        rig.now,
    );
    let report = rig.tick(&released);
    assert!(report.ffb.is_some_and(|f| f.smoothed > 0.0));
    for _ in 0..60 {
        rig.tick(&released);
    }
    assert!(rig.engine.wheel().angle() > held);
    Ok(())
}

#[test]
fn test_submitted_events_apply_next_tick() -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig::default();
    let mut rig = Rig::new(config.clone(), ControlMode::Wheel)?;
    let f = frame(rim(&config, 180.0), rim(&config, 0.0));
    assert!(!rig.engine.submit(LEFT_ID, true, false));
    rig.tick(&f);
    assert!(rig.engine.submit(LEFT_ID, true, false));
    assert!(!rig.engine.submit(99, true, false));
    let report = rig.tick(&f);
    assert_eq!(report.attachments[0], Attachment::Wheel);
    Ok(())
}

#[test]
fn test_bike_leans_with_both_hands() -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig::default();
    let mut rig = Rig::new(config.clone(), ControlMode::Bike)?;
    let [cx, cy, cz] = config.bike.center;
    let shift = 0.3;
    let l = Vec3::new(cx - 0.25 + shift, cy, cz);
    let r = Vec3::new(cx + 0.25 + shift, cy, cz);

    rig.tick(&frame(l, r));
    let grabbing = gripping(gripping(frame(l, r), Hand::Left, true), Hand::Right, true);
    let report = rig.tick(&grabbing);
    let height = config.bike.handlebar_height / 100.0;
    let expected = (shift / height).asin().to_degrees();
    assert_approx_eq!(report.lean_deg.unwrap_or_default(), expected, 1e-9);
    assert!(rig.render.last.as_ref().is_some_and(|s| s.bike.is_some()));
    Ok(())
}
