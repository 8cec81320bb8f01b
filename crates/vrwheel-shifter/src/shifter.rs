//! The shifter state machine driven by the holding hand.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vrwheel_geometry::{Capsule, Vec3};

use crate::grid::{Deflection, GridMargins, GridResolver, SequentialGate};
use crate::stick::StickGeometry;
use crate::types::{
    Gear, GearChange, GridCell, RANGE_BUTTON, ReverseCorner, SEQUENTIAL_DOWN_BUTTON,
    SEQUENTIAL_UP_BUTTON, SPLITTER_BUTTON, ShiftDirection,
};

pub const DEFAULT_UNLOCK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShifterConfig {
    pub geometry: StickGeometry,
    pub margins: GridMargins,
    pub reverse: ReverseCorner,
    pub sequential: bool,
    /// Trigger value that lifts the reverse lock.
    pub unlock_threshold: f64,
}

impl Default for ShifterConfig {
    fn default() -> Self {
        Self {
            geometry: StickGeometry::default(),
            margins: GridMargins::default(),
            reverse: ReverseCorner::default(),
            sequential: false,
            unlock_threshold: DEFAULT_UNLOCK_THRESHOLD,
        }
    }
}

/// One frame of input from the hand holding the shifter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShifterInput {
    pub hand: Vec3,
    pub trigger: f64,
    /// Splitter button went down this frame.
    pub splitter_pressed: bool,
    /// Range button went down this frame.
    pub range_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShifterEvent {
    GearChanged(GearChange),
    Sequential(ShiftDirection),
    SplitterToggled(bool),
    RangeToggled(bool),
}

/// What one update produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShifterUpdate {
    pub gear_change: Option<GearChange>,
    pub sequential: Option<ShiftDirection>,
    pub splitter: Option<bool>,
    pub range: Option<bool>,
}

impl ShifterUpdate {
    pub fn events(&self) -> impl Iterator<Item = ShifterEvent> {
        self.gear_change
            .map(ShifterEvent::GearChanged)
            .into_iter()
            .chain(self.sequential.map(ShifterEvent::Sequential))
            .chain(self.splitter.map(ShifterEvent::SplitterToggled))
            .chain(self.range.map(ShifterEvent::RangeToggled))
    }
}

/// Full output button state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShifterButtons {
    pub gear: Option<Gear>,
    pub splitter: bool,
    pub range: bool,
    pub sequential: Option<ShiftDirection>,
}

impl ShifterButtons {
    /// Every shifter button with its state; exactly one gear button is set
    /// while a gear is engaged.
    pub fn iter(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        Gear::ALL
            .into_iter()
            .map(|g| (g.button(), self.gear == Some(g)))
            .chain([
                (SPLITTER_BUTTON, self.splitter),
                (RANGE_BUTTON, self.range),
                (
                    SEQUENTIAL_UP_BUTTON,
                    self.sequential == Some(ShiftDirection::Up),
                ),
                (
                    SEQUENTIAL_DOWN_BUTTON,
                    self.sequential == Some(ShiftDirection::Down),
                ),
            ])
    }
}

/// Render-facing view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShifterSnapshot {
    pub cell: GridCell,
    pub knob: Vec3,
    pub held: bool,
    pub splitter: bool,
    pub range: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hold {
    /// Hand minus knob at grab time.
    offset: Vec3,
    yaw_rad: f64,
}

/// Shifter state owned by the frame loop.
///
/// # Examples
///
/// ```
/// use vrwheel_geometry::Vec3;
/// use vrwheel_shifter::{Gear, Shifter, ShifterConfig, ShifterInput};
///
/// let mut shifter = Shifter::new(ShifterConfig::default());
/// let knob = shifter.knob();
/// shifter.grab(knob, 0.0);
///
/// let travel = shifter.config().geometry.travel();
/// let input = ShifterInput {
///     hand: knob + Vec3::new(0.0, 0.0, travel),
///     ..ShifterInput::default()
/// };
/// let update = shifter.update(&input);
/// assert_eq!(shifter.gear(), Some(Gear::Third));
/// assert!(update.gear_change.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Shifter {
    config: ShifterConfig,
    grid: GridResolver,
    cell: GridCell,
    deflection: Deflection,
    hold: Option<Hold>,
    splitter: bool,
    range: bool,
    gate: SequentialGate,
    pulse: Option<ShiftDirection>,
}

impl Default for Shifter {
    fn default() -> Self {
        Self::new(ShifterConfig::default())
    }
}

impl Shifter {
    pub fn new(config: ShifterConfig) -> Self {
        Self {
            config,
            grid: GridResolver::new(config.margins, config.reverse),
            cell: GridCell::default(),
            deflection: Deflection::default(),
            hold: None,
            splitter: false,
            range: false,
            gate: SequentialGate::default(),
            pulse: None,
        }
    }

    pub fn config(&self) -> &ShifterConfig {
        &self.config
    }

    pub fn cell(&self) -> GridCell {
        self.cell
    }

    pub fn gear(&self) -> Option<Gear> {
        self.cell.gear()
    }

    pub fn deflection(&self) -> Deflection {
        self.deflection
    }

    pub fn is_held(&self) -> bool {
        self.hold.is_some()
    }

    pub fn splitter(&self) -> bool {
        self.splitter
    }

    pub fn range(&self) -> bool {
        self.range
    }

    fn yaw(&self) -> f64 {
        self.hold.map_or(0.0, |h| h.yaw_rad)
    }

    /// Current knob position. In H mode the knob sits in its cell; in
    /// sequential mode it follows the hand along the gate.
    pub fn knob(&self) -> Vec3 {
        let geometry = &self.config.geometry;
        if self.config.sequential {
            let d = Deflection::new(0.0, self.deflection.z);
            geometry.knob_at(d, self.yaw())
        } else {
            geometry.knob_for_cell(self.cell, self.config.reverse, self.yaw())
        }
    }

    pub fn capsule(&self) -> Capsule {
        self.config.geometry.capsule(self.knob())
    }

    /// Whether `point` touches the stick.
    pub fn contains(&self, point: Vec3) -> bool {
        self.capsule().contains(point)
    }

    /// Attach a hand. `yaw_deg` orients the gate, usually the head yaw.
    pub fn grab(&mut self, hand: Vec3, yaw_deg: f64) {
        let yaw_rad = if yaw_deg.is_finite() {
            yaw_deg.to_radians()
        } else {
            0.0
        };
        let geometry = &self.config.geometry;
        let knob = if self.config.sequential {
            geometry.knob_at(Deflection::default(), yaw_rad)
        } else {
            geometry.knob_for_cell(self.cell, self.config.reverse, yaw_rad)
        };
        self.hold = Some(Hold {
            offset: hand - knob,
            yaw_rad,
        });
        debug!(cell = %self.cell, "shifter grabbed");
    }

    /// Let go. An H-pattern stick stays in its gear; a sequential stick
    /// springs back to center.
    pub fn release(&mut self) {
        if self.hold.take().is_some() {
            debug!(cell = %self.cell, "shifter released");
        }
        if self.config.sequential {
            self.deflection = Deflection::default();
            self.gate.reset();
        }
        self.pulse = None;
    }

    /// Advance one frame. Without a holding hand only the sequential
    /// pulse is cleared.
    pub fn update(&mut self, input: &ShifterInput) -> ShifterUpdate {
        self.pulse = None;
        let Some(hold) = self.hold else {
            return ShifterUpdate::default();
        };
        let mut update = ShifterUpdate::default();

        if input.splitter_pressed {
            self.splitter = !self.splitter;
            update.splitter = Some(self.splitter);
        }
        if input.range_pressed {
            self.range = !self.range;
            update.range = Some(self.range);
        }

        let target = input.hand - hold.offset;
        self.deflection = self.config.geometry.deflection(target, hold.yaw_rad);

        if self.config.sequential {
            self.pulse = self.gate.update(self.deflection.z, &self.config.margins);
            if let Some(direction) = self.pulse {
                debug!(?direction, "sequential shift");
            }
            update.sequential = self.pulse;
            return update;
        }

        let unlocked = input.trigger >= self.config.unlock_threshold;
        let next = self.grid.resolve(self.cell, self.deflection, unlocked);
        if next != self.cell {
            update.gear_change = GearChange::between(self.cell, next);
            if let Some(change) = update.gear_change {
                debug!(from = %self.cell, to = %next, direction = ?change.direction, "gear change");
            }
            self.cell = next;
        }
        update
    }

    pub fn buttons(&self) -> ShifterButtons {
        ShifterButtons {
            gear: self.cell.gear(),
            splitter: self.splitter,
            range: self.range,
            sequential: self.pulse,
        }
    }

    pub fn snapshot(&self) -> ShifterSnapshot {
        ShifterSnapshot {
            cell: self.cell,
            knob: self.knob(),
            held: self.is_held(),
            splitter: self.splitter,
            range: self.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, REVERSE_BUTTON};

    fn held() -> (Shifter, Vec3, f64) {
        let mut shifter = Shifter::default();
        let knob = shifter.knob();
        shifter.grab(knob, 0.0);
        let travel = shifter.config().geometry.travel();
        (shifter, knob, travel)
    }

    fn at(knob: Vec3, travel: f64, x: f64, z: f64) -> ShifterInput {
        ShifterInput {
            hand: knob + Vec3::new(x * travel, 0.0, z * travel),
            ..ShifterInput::default()
        }
    }

    #[test]
    fn test_not_held_ignores_input() {
        let mut shifter = Shifter::default();
        let update = shifter.update(&ShifterInput {
            hand: Vec3::new(10.0, 0.0, 10.0),
            splitter_pressed: true,
            ..ShifterInput::default()
        });
        assert_eq!(update, ShifterUpdate::default());
        assert!(!shifter.splitter());
    }

    #[test]
    fn test_grab_does_not_move_stick() {
        let (mut shifter, knob, _) = held();
        let offset_hand = knob + Vec3::new(0.02, 0.03, 0.0);
        shifter.release();
        shifter.grab(offset_hand, 0.0);
        shifter.update(&ShifterInput {
            hand: offset_hand,
            ..ShifterInput::default()
        });
        assert_eq!(shifter.cell(), GridCell::Neutral(Column::Center));
    }

    #[test]
    fn test_row_up_sets_exactly_one_gear_button() {
        let (mut shifter, knob, travel) = held();
        shifter.update(&at(knob, travel, 0.0, 0.9));
        let on: Vec<u8> = shifter
            .buttons()
            .iter()
            .filter(|(_, pressed)| *pressed)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(on, vec![Gear::Third.button()]);
    }

    #[test]
    fn test_gear_stays_after_release() {
        let (mut shifter, knob, travel) = held();
        shifter.update(&at(knob, travel, 0.0, -1.0));
        shifter.release();
        shifter.update(&ShifterInput::default());
        assert_eq!(shifter.gear(), Some(Gear::Fourth));
    }

    #[test]
    fn test_reverse_with_trigger() {
        let (mut shifter, knob, travel) = held();
        let mut input = at(knob, travel, -1.0, 0.0);
        input.trigger = 0.9;
        shifter.update(&input);
        let mut input = at(knob, travel, -1.0, -1.0);
        input.trigger = 0.9;
        let update = shifter.update(&input);
        assert_eq!(shifter.gear(), Some(Gear::Reverse));
        let change = update.gear_change;
        assert_eq!(change.map(|c| c.direction), Some(ShiftDirection::Down));
        assert!(shifter.buttons().iter().any(|b| b == (REVERSE_BUTTON, true)));
    }

    #[test]
    fn test_toggles_latch() {
        let (mut shifter, knob, travel) = held();
        let mut input = at(knob, travel, 0.0, 0.0);
        input.splitter_pressed = true;
        let update = shifter.update(&input);
        assert_eq!(update.splitter, Some(true));
        input.splitter_pressed = false;
        input.range_pressed = true;
        shifter.update(&input);
        input.range_pressed = false;
        shifter.update(&input);
        assert!(shifter.splitter());
        assert!(shifter.range());
        let buttons = shifter.buttons();
        assert!(buttons.iter().any(|b| b == (SPLITTER_BUTTON, true)));
        assert!(buttons.iter().any(|b| b == (RANGE_BUTTON, true)));
    }

    #[test]
    fn test_sequential_pulses_once() {
        let config = ShifterConfig {
            sequential: true,
            ..ShifterConfig::default()
        };
        let mut shifter = Shifter::new(config);
        let knob = shifter.knob();
        shifter.grab(knob, 0.0);
        let travel = shifter.config().geometry.travel();

        let update = shifter.update(&at(knob, travel, 0.0, 0.9));
        assert_eq!(update.sequential, Some(ShiftDirection::Up));
        assert_eq!(shifter.buttons().sequential, Some(ShiftDirection::Up));
        shifter.update(&at(knob, travel, 0.0, 0.9));
        assert_eq!(shifter.buttons().sequential, None);
        assert_eq!(shifter.gear(), None);
    }

    #[test]
    fn test_events_iterator() {
        let update = ShifterUpdate {
            sequential: Some(ShiftDirection::Down),
            range: Some(false),
            ..ShifterUpdate::default()
        };
        let events: Vec<ShifterEvent> = update.events().collect();
        assert_eq!(
            events,
            vec![
                ShifterEvent::Sequential(ShiftDirection::Down),
                ShifterEvent::RangeToggled(false)
            ]
        );
    }

    #[test]
    fn test_capsule_follows_knob() {
        let (mut shifter, knob, travel) = held();
        assert!(shifter.contains(knob));
        shifter.update(&at(knob, travel, 0.7, 0.0));
        shifter.update(&at(knob, travel, 0.7, 1.0));
        assert_eq!(shifter.gear(), Some(Gear::Fifth));
        assert!(shifter.contains(shifter.knob()));
        assert!(shifter.snapshot().held);
    }
}
