//! Which hand holds which control surface.
//!
//! [`AttachmentMachine`] is the only writer of per-hand [`Attachment`]
//! state. Grip edges come from [`GripDetector`], envelope crossings from
//! [`AutoEnvelope`]; both are turned into [`GrabEvent`]s and applied
//! against the hand's [`Reach`] for the current frame.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vrwheel_config::GripMode;

use crate::pose::{Hand, HandPose, buttons};

pub const GRIP_PRESS_THRESHOLD: f64 = 0.6;
pub const GRIP_RELEASE_THRESHOLD: f64 = 0.4;
pub const GRAB_PULSE_MICROS: u16 = 250;
pub const EDIT_PULSE_MICROS: u16 = 3000;
pub const TRIPLE_GRIP_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Attachment {
    #[default]
    Free,
    Wheel,
    /// Attached by entering the holding envelope, not by the grip.
    WheelAuto,
    Shifter,
}

impl Attachment {
    pub fn is_wheel(self) -> bool {
        matches!(self, Attachment::Wheel | Attachment::WheelAuto)
    }

    pub fn is_attached(self) -> bool {
        self != Attachment::Free
    }
}

/// How the wheel is taken hold of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    Manual(GripMode),
    /// Hands attach by entering the envelope around the rim. The grip still
    /// takes the shifter and promotes an envelope hold to a manual one.
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabEvent {
    pub hand: Hand,
    pub attach: bool,
    pub auto: bool,
}

/// Surfaces a hand could take this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reach {
    /// Inside the shifter capsule.
    pub shifter: bool,
    /// Close enough to the rim.
    pub wheel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentChange {
    pub hand: Hand,
    pub from: Attachment,
    pub to: Attachment,
}

impl AttachmentChange {
    /// A grip-driven grab, as opposed to an envelope entry or a release.
    pub fn is_manual_attach(&self) -> bool {
        matches!(self.to, Attachment::Wheel | Attachment::Shifter)
            && self.from != Attachment::WheelAuto
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentMachine {
    states: [Attachment; 2],
    mode: GrabMode,
}

impl AttachmentMachine {
    pub fn new(mode: GrabMode) -> Self {
        Self {
            states: [Attachment::Free; 2],
            mode,
        }
    }

    pub fn mode(&self) -> GrabMode {
        self.mode
    }

    pub fn state(&self, hand: Hand) -> Attachment {
        self.states.get(hand.index()).copied().unwrap_or_default()
    }

    pub fn states(&self) -> [Attachment; 2] {
        self.states
    }

    pub fn shifter_holder(&self) -> Option<Hand> {
        Hand::ALL
            .into_iter()
            .find(|&h| self.state(h) == Attachment::Shifter)
    }

    /// Turn a grip edge into an event according to the grab mode.
    pub fn grip(&mut self, hand: Hand, pressed: bool, reach: Reach) -> Option<AttachmentChange> {
        let attach = match self.mode {
            GrabMode::Manual(GripMode::Toggle) => {
                if !pressed {
                    return None;
                }
                !matches!(self.state(hand), Attachment::Wheel | Attachment::Shifter)
            }
            GrabMode::Manual(GripMode::Hold) | GrabMode::Automatic => pressed,
        };
        self.apply(
            GrabEvent {
                hand,
                attach,
                auto: false,
            },
            reach,
        )
    }

    /// Apply one event; requests that do not fit the current state are
    /// ignored.
    pub fn apply(&mut self, event: GrabEvent, reach: Reach) -> Option<AttachmentChange> {
        let from = self.state(event.hand);
        let to = self.next_state(event, from, reach)?;
        if to == from {
            return None;
        }
        let slot = self.states.get_mut(event.hand.index())?;
        *slot = to;
        debug!(hand = %event.hand, ?from, ?to, auto = event.auto, "attachment changed");
        Some(AttachmentChange {
            hand: event.hand,
            from,
            to,
        })
    }

    fn next_state(&self, event: GrabEvent, from: Attachment, reach: Reach) -> Option<Attachment> {
        let GrabEvent { hand, attach, auto } = event;
        match (attach, auto, from) {
            (true, true, Attachment::Free) => Some(Attachment::WheelAuto),
            (true, false, Attachment::WheelAuto) => Some(Attachment::Wheel),
            (true, false, Attachment::Free) => {
                if reach.shifter {
                    if self.state(hand.other()) == Attachment::Shifter {
                        debug!(%hand, "shifter already held by the other hand");
                        return None;
                    }
                    Some(Attachment::Shifter)
                } else if reach.wheel && self.mode != GrabMode::Automatic {
                    Some(Attachment::Wheel)
                } else {
                    None
                }
            }
            (false, true, Attachment::WheelAuto) => Some(Attachment::Free),
            (false, false, Attachment::Wheel | Attachment::Shifter) => Some(Attachment::Free),
            _ => None,
        }
    }

    /// Drop every hold, e.g. on entering edit mode.
    pub fn release_all(&mut self) -> Vec<AttachmentChange> {
        let mut changes = Vec::new();
        for hand in Hand::ALL {
            let from = self.state(hand);
            if from.is_attached() {
                if let Some(slot) = self.states.get_mut(hand.index()) {
                    *slot = Attachment::Free;
                }
                changes.push(AttachmentChange {
                    hand,
                    from,
                    to: Attachment::Free,
                });
            }
        }
        changes
    }
}

/// Grip press/release with hysteresis on the analog grip.
#[derive(Debug, Clone, Default)]
pub struct GripDetector {
    down: [bool; 2],
}

impl GripDetector {
    /// `Some(true)` on a press edge, `Some(false)` on a release edge.
    pub fn update(&mut self, hand: Hand, pose: &HandPose) -> Option<bool> {
        let button = pose.is_pressed(buttons::GRIP);
        let slot = self.down.get_mut(hand.index())?;
        let was = *slot;
        let now = if !pose.valid {
            false
        } else if was {
            button || pose.grip >= GRIP_RELEASE_THRESHOLD
        } else {
            button || pose.grip >= GRIP_PRESS_THRESHOLD
        };
        *slot = now;
        (now != was).then_some(now)
    }

    pub fn is_down(&self, hand: Hand) -> bool {
        self.down.get(hand.index()).copied().unwrap_or(false)
    }
}

/// Envelope entry and exit for automatic grabbing.
#[derive(Debug, Clone, Default)]
pub struct AutoEnvelope {
    inside: [bool; 2],
}

impl AutoEnvelope {
    pub fn update(&mut self, hand: Hand, inside: bool) -> Option<GrabEvent> {
        let slot = self.inside.get_mut(hand.index())?;
        if *slot == inside {
            return None;
        }
        *slot = inside;
        Some(GrabEvent {
            hand,
            attach: inside,
            auto: true,
        })
    }
}

/// Three grip presses on each hand inside one window.
#[derive(Debug, Clone)]
pub struct TripleGrip {
    presses: [VecDeque<Instant>; 2],
    window: Duration,
}

impl Default for TripleGrip {
    fn default() -> Self {
        Self::new(TRIPLE_GRIP_WINDOW)
    }
}

impl TripleGrip {
    pub fn new(window: Duration) -> Self {
        Self {
            presses: [VecDeque::with_capacity(3), VecDeque::with_capacity(3)],
            window,
        }
    }

    /// Record a press; returns `true` when the gesture completes, after
    /// which both buffers start over.
    pub fn press(&mut self, hand: Hand, now: Instant) -> bool {
        if let Some(buf) = self.presses.get_mut(hand.index()) {
            if buf.len() >= 3 {
                buf.pop_front();
            }
            buf.push_back(now);
        }
        if self.complete() {
            self.clear();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        for buf in &mut self.presses {
            buf.clear();
        }
    }

    fn complete(&self) -> bool {
        let mut oldest: Option<Instant> = None;
        let mut newest: Option<Instant> = None;
        for buf in &self.presses {
            let (Some(&first), Some(&last)) = (buf.front(), buf.back()) else {
                return false;
            };
            if buf.len() < 3 {
                return false;
            }
            oldest = Some(oldest.map_or(first, |o| o.min(first)));
            newest = Some(newest.map_or(last, |n| n.max(last)));
        }
        match (oldest, newest) {
            (Some(o), Some(n)) => n.saturating_duration_since(o) <= self.window,
            _ => false,
        }
    }
}
