//! Per-frame tracking input: hands, head and button bitmasks.

use serde::{Deserialize, Serialize};
use vrwheel_geometry::{Orientation, Vec3};

/// OpenVR button bit numbers.
pub mod buttons {
    /// Application menu, the "B" button on index-style controllers.
    pub const MENU: u32 = 1;
    pub const GRIP: u32 = 2;
    pub const A: u32 = 7;
    /// Touchpad or joystick click.
    pub const TOUCHPAD: u32 = 32;
    pub const TRIGGER: u32 = 33;

    /// Mask for a single button bit; bits past 63 map to an empty mask.
    pub const fn mask(bit: u32) -> u64 {
        match 1u64.checked_shl(bit) {
            Some(m) => m,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub const fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    pub const fn other(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D stick or touchpad sample, each component in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis2 {
    pub x: f64,
    pub y: f64,
}

impl Axis2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandPose {
    pub device_id: u32,
    pub position: Vec3,
    pub orientation: Orientation,
    pub trigger: f64,
    pub grip: f64,
    pub stick: Axis2,
    pub pressed: u64,
    pub touched: u64,
    pub valid: bool,
}

impl HandPose {
    pub fn at(device_id: u32, position: Vec3) -> Self {
        Self {
            device_id,
            position,
            valid: true,
            ..Self::default()
        }
    }

    pub fn is_pressed(&self, bit: u32) -> bool {
        self.pressed & buttons::mask(bit) != 0
    }

    pub fn is_touched(&self, bit: u32) -> bool {
        self.touched & buttons::mask(bit) != 0
    }

    pub fn with_pressed(mut self, bit: u32, down: bool) -> Self {
        if down {
            self.pressed |= buttons::mask(bit);
        } else {
            self.pressed &= !buttons::mask(bit);
        }
        self
    }

    pub fn with_touched(mut self, bit: u32, down: bool) -> Self {
        if down {
            self.touched |= buttons::mask(bit);
        } else {
            self.touched &= !buttons::mask(bit);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadPose {
    pub position: Vec3,
    pub orientation: Orientation,
}

/// Everything the pose source reports for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseFrame {
    pub head: HeadPose,
    pub left: HandPose,
    pub right: HandPose,
}

impl PoseFrame {
    pub fn hand(&self, hand: Hand) -> &HandPose {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn hand_mut(&mut self, hand: Hand) -> &mut HandPose {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Which hand a device id belongs to, if any.
    pub fn hand_for_device(&self, device_id: u32) -> Option<Hand> {
        Hand::ALL
            .into_iter()
            .find(|&h| self.hand(h).valid && self.hand(h).device_id == device_id)
    }
}

/// Button transitions of one hand between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdges {
    pub pressed: u64,
    pub released: u64,
    pub touched: u64,
    pub untouched: u64,
}

impl ButtonEdges {
    pub fn between(previous: &HandPose, current: &HandPose) -> Self {
        Self {
            pressed: current.pressed & !previous.pressed,
            released: previous.pressed & !current.pressed,
            touched: current.touched & !previous.touched,
            untouched: previous.touched & !current.touched,
        }
    }

    pub fn pressed(&self, bit: u32) -> bool {
        self.pressed & buttons::mask(bit) != 0
    }

    pub fn released(&self, bit: u32) -> bool {
        self.released & buttons::mask(bit) != 0
    }

    pub fn touched(&self, bit: u32) -> bool {
        self.touched & buttons::mask(bit) != 0
    }

    pub fn untouched(&self, bit: u32) -> bool {
        self.untouched & buttons::mask(bit) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.pressed | self.released | self.touched | self.untouched == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_track_press_and_release() {
        let before = HandPose::default().with_pressed(buttons::A, true);
        let after = HandPose::default().with_pressed(buttons::MENU, true);
        let edges = ButtonEdges::between(&before, &after);
        assert!(edges.pressed(buttons::MENU));
        assert!(edges.released(buttons::A));
        assert!(!edges.pressed(buttons::A));
        assert!(!edges.is_empty());
    }

    #[test]
    fn test_high_bits_fit_in_mask() {
        assert_eq!(buttons::mask(buttons::TRIGGER), 1u64 << 33);
        assert_eq!(buttons::mask(64), 0);
    }

    #[test]
    fn test_hand_for_device_ignores_invalid() {
        let mut frame = PoseFrame::default();
        frame.left = HandPose::at(3, Vec3::ZERO);
        frame.right = HandPose {
            device_id: 4,
            valid: false,
            ..HandPose::default()
        };
        assert_eq!(frame.hand_for_device(3), Some(Hand::Left));
        assert_eq!(frame.hand_for_device(4), None);
        assert_eq!(frame.hand_for_device(9), None);
    }

    #[test]
    fn test_pose_frame_parses_sparse_json() -> Result<(), Box<dyn std::error::Error>> {
        let frame: PoseFrame =
            serde_json::from_str(r#"{"left":{"position":{"x":0.1,"y":0.0,"z":0.0},"valid":true}}"#)?;
        assert!(frame.left.valid);
        assert!(!frame.right.valid);
        assert_eq!(frame.left.pressed, 0);
        Ok(())
    }
}
