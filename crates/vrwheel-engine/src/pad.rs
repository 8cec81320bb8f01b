//! Plain controller passthrough: triggers, sticks and face buttons.

use vrwheel_config::{GeneralSettings, StickButtons};
use vrwheel_geometry::unit_to_axis;

use crate::pose::{ButtonEdges, Hand, HandPose, PoseFrame, buttons};
use crate::ports::{VirtualControllerSink, axes};

/// Stick travel that presses a direction bound as a button.
pub const STICK_BUTTON_THRESHOLD: f64 = 0.8;
/// Rest band of a stick direction bound as an axis.
pub const STICK_DEAD_BAND: f64 = 0.1;
/// Touchpad radius treated as the center zone.
pub const TOUCHPAD_CENTER_RADIUS: f64 = 0.3;

pub const LEFT_TRIGGER_TOUCH_BUTTON: u8 = 31;
pub const RIGHT_TRIGGER_TOUCH_BUTTON: u8 = 32;

/// Fixed ids for forwarded controller buttons of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandButtonIds {
    pub trigger: u8,
    pub grip: u8,
    pub menu: u8,
    pub a: u8,
    /// First touchpad zone button; zones occupy `base..base + 5`.
    pub zone_base: u8,
    pub trigger_touch: u8,
}

pub const LEFT_BUTTONS: HandButtonIds = HandButtonIds {
    trigger: 1,
    grip: 2,
    menu: 3,
    a: 17,
    zone_base: 4,
    trigger_touch: LEFT_TRIGGER_TOUCH_BUTTON,
};

pub const RIGHT_BUTTONS: HandButtonIds = HandButtonIds {
    trigger: 9,
    grip: 10,
    menu: 11,
    a: 18,
    zone_base: 12,
    trigger_touch: RIGHT_TRIGGER_TOUCH_BUTTON,
};

impl HandButtonIds {
    pub fn for_hand(hand: Hand) -> Self {
        match hand {
            Hand::Left => LEFT_BUTTONS,
            Hand::Right => RIGHT_BUTTONS,
        }
    }
}

/// How one stick axis reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlBinding {
    /// Full range axis, resting at the middle.
    Axis(u8),
    /// At least one direction is a button. A direction without a button
    /// drives `axis` with the deflection magnitude.
    ButtonPair {
        axis: u8,
        minus: Option<u8>,
        plus: Option<u8>,
    },
}

impl ControlBinding {
    pub fn from_flags(axis: u8, minus: (u8, bool), plus: (u8, bool)) -> Self {
        match (minus.1, plus.1) {
            (false, false) => ControlBinding::Axis(axis),
            (m, p) => ControlBinding::ButtonPair {
                axis,
                minus: m.then_some(minus.0),
                plus: p.then_some(plus.0),
            },
        }
    }

    /// Write this frame's value for deflection `v`.
    pub fn resolve<S: VirtualControllerSink + ?Sized>(&self, v: f64, sink: &mut S) {
        let v = if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        match *self {
            ControlBinding::Axis(axis) => {
                let value = if v.abs() < STICK_DEAD_BAND {
                    0.5
                } else {
                    (v + 1.0) / 2.0
                };
                sink.set_axis(axis, unit_to_axis(value));
            }
            ControlBinding::ButtonPair { axis, minus, plus } => {
                let side_threshold = |b: Option<u8>| {
                    if b.is_some() {
                        STICK_BUTTON_THRESHOLD
                    } else {
                        STICK_DEAD_BAND
                    }
                };
                let minus_on = v <= -side_threshold(minus);
                let plus_on = v >= side_threshold(plus);
                let mut axis_value = 0.0;
                if let Some(b) = minus {
                    sink.set_button(b, minus_on);
                } else if minus_on {
                    axis_value = v.abs();
                }
                if let Some(b) = plus {
                    sink.set_button(b, plus_on);
                } else if plus_on {
                    axis_value = v.abs();
                }
                if minus.is_none() || plus.is_none() {
                    sink.set_axis(axis, unit_to_axis(axis_value));
                }
            }
        }
    }
}

/// Bindings for the X and Y axes of one stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickBinding {
    pub x: ControlBinding,
    pub y: ControlBinding,
}

impl StickBinding {
    pub fn left(flags: StickButtons) -> Self {
        Self {
            x: ControlBinding::from_flags(axes::Z, (34, flags.left), (35, flags.right)),
            y: ControlBinding::from_flags(axes::Y, (36, flags.down), (37, flags.up)),
        }
    }

    pub fn right(flags: StickButtons) -> Self {
        Self {
            x: ControlBinding::from_flags(axes::RX, (38, flags.left), (39, flags.right)),
            y: ControlBinding::from_flags(axes::RY, (40, flags.down), (41, flags.up)),
        }
    }
}

/// Touchpad zone: 0 in the middle, 1..=4 by quadrant.
pub fn touchpad_zone(x: f64, y: f64) -> u8 {
    if !(x.hypot(y) >= TOUCHPAD_CENTER_RADIUS) {
        return 0;
    }
    if x >= y {
        if y > -x { 1 } else { 2 }
    } else if y < -x {
        3
    } else {
        4
    }
}

#[derive(Debug, Clone)]
pub struct VirtualPad {
    sticks: [StickBinding; 2],
    trigger_press_button: bool,
    trigger_pre_press_button: bool,
    multibutton_trackpad: bool,
}

impl Default for VirtualPad {
    fn default() -> Self {
        Self::new(&GeneralSettings::default())
    }
}

impl VirtualPad {
    pub fn new(settings: &GeneralSettings) -> Self {
        Self {
            sticks: [
                StickBinding::left(settings.left_stick_buttons()),
                StickBinding::right(settings.right_stick_buttons()),
            ],
            trigger_press_button: settings.trigger_press_button,
            trigger_pre_press_button: settings.trigger_pre_press_button,
            multibutton_trackpad: settings.multibutton_trackpad,
        }
    }

    pub fn stick(&self, hand: Hand) -> StickBinding {
        let [left, right] = self.sticks;
        match hand {
            Hand::Left => left,
            Hand::Right => right,
        }
    }

    /// Zone button a touchpad press lands on.
    pub fn zone_button(&self, hand: Hand, pose: &HandPose) -> u8 {
        let zone = if self.multibutton_trackpad {
            touchpad_zone(pose.stick.x, pose.stick.y)
        } else {
            0
        };
        HandButtonIds::for_hand(hand).zone_base + zone
    }

    pub fn update<S: VirtualControllerSink + ?Sized>(
        &self,
        frame: &PoseFrame,
        edges: &[ButtonEdges; 2],
        sink: &mut S,
    ) {
        sink.set_axis(axes::SLIDER_0, unit_to_axis(frame.left.trigger));
        sink.set_axis(axes::SLIDER_1, unit_to_axis(frame.right.trigger));
        for (hand, e) in Hand::ALL.into_iter().zip(edges) {
            let pose = frame.hand(hand);
            let stick = self.stick(hand);
            stick.x.resolve(pose.stick.x, sink);
            stick.y.resolve(pose.stick.y, sink);
            self.forward_buttons(hand, pose, e, sink);
        }
    }

    fn forward_buttons<S: VirtualControllerSink + ?Sized>(
        &self,
        hand: Hand,
        pose: &HandPose,
        e: &ButtonEdges,
        sink: &mut S,
    ) {
        let ids = HandButtonIds::for_hand(hand);
        let simple = [
            (buttons::GRIP, ids.grip),
            (buttons::MENU, ids.menu),
            (buttons::A, ids.a),
        ];
        for (bit, id) in simple {
            if e.pressed(bit) {
                sink.set_button(id, true);
            } else if e.released(bit) {
                sink.set_button(id, false);
            }
        }

        if e.pressed(buttons::TRIGGER) && self.trigger_press_button {
            sink.set_button(ids.trigger, true);
        } else if e.released(buttons::TRIGGER) {
            sink.set_button(ids.trigger, false);
        }

        if e.touched(buttons::TRIGGER) && self.trigger_pre_press_button {
            sink.set_button(ids.trigger_touch, true);
        } else if e.untouched(buttons::TRIGGER) {
            sink.set_button(ids.trigger_touch, false);
        }

        if e.pressed(buttons::TOUCHPAD) {
            sink.set_button(self.zone_button(hand, pose), true);
        } else if e.released(buttons::TOUCHPAD) {
            for zone in 0..5 {
                sink.set_button(ids.zone_base + zone, false);
            }
        }
    }
}
