//! Gear grid type definitions

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ShifterError, ShifterResult};

/// Output button of the first forward gear; gears 1..=6 are consecutive.
pub const GEAR_BUTTON_BASE: u8 = 50;
pub const REVERSE_BUTTON: u8 = 56;
pub const SPLITTER_BUTTON: u8 = 57;
pub const RANGE_BUTTON: u8 = 58;
pub const SEQUENTIAL_UP_BUTTON: u8 = 59;
pub const SEQUENTIAL_DOWN_BUTTON: u8 = 60;

/// Normalized x of the outer forward columns.
pub const OUTER_COLUMN_X: f64 = 2.0 / 3.0;
/// Normalized z of the in-gate half positions.
pub const IN_GATE_Z: f64 = 0.5;

/// An engageable gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gear {
    Reverse,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl Gear {
    pub const ALL: [Gear; 7] = [
        Gear::Reverse,
        Gear::First,
        Gear::Second,
        Gear::Third,
        Gear::Fourth,
        Gear::Fifth,
        Gear::Sixth,
    ];

    /// Reverse is -1, forward gears are 1..=6; neutral (no gear) is 0.
    pub fn ordinal(self) -> i8 {
        match self {
            Gear::Reverse => -1,
            Gear::First => 1,
            Gear::Second => 2,
            Gear::Third => 3,
            Gear::Fourth => 4,
            Gear::Fifth => 5,
            Gear::Sixth => 6,
        }
    }

    pub fn button(self) -> u8 {
        match self {
            Gear::Reverse => REVERSE_BUTTON,
            Gear::First => GEAR_BUTTON_BASE,
            Gear::Second => GEAR_BUTTON_BASE + 1,
            Gear::Third => GEAR_BUTTON_BASE + 2,
            Gear::Fourth => GEAR_BUTTON_BASE + 3,
            Gear::Fifth => GEAR_BUTTON_BASE + 4,
            Gear::Sixth => GEAR_BUTTON_BASE + 5,
        }
    }

    /// The forward gear sitting at `column`/`row`. The reverse gate has no
    /// forward gears.
    pub fn at(column: Column, row: Row) -> Option<Gear> {
        match (column, row) {
            (Column::Left, Row::Up) => Some(Gear::First),
            (Column::Left, Row::Down) => Some(Gear::Second),
            (Column::Center, Row::Up) => Some(Gear::Third),
            (Column::Center, Row::Down) => Some(Gear::Fourth),
            (Column::Right, Row::Up) => Some(Gear::Fifth),
            (Column::Right, Row::Down) => Some(Gear::Sixth),
            (Column::ReverseGate, _) => None,
        }
    }

    pub fn column(self) -> Column {
        match self {
            Gear::Reverse => Column::ReverseGate,
            Gear::First | Gear::Second => Column::Left,
            Gear::Third | Gear::Fourth => Column::Center,
            Gear::Fifth | Gear::Sixth => Column::Right,
        }
    }

    /// Row of this gear; reverse takes its row from the corner.
    pub fn row(self, corner: ReverseCorner) -> Row {
        match self {
            Gear::Reverse => corner.row(),
            Gear::First | Gear::Third | Gear::Fifth => Row::Up,
            Gear::Second | Gear::Fourth | Gear::Sixth => Row::Down,
        }
    }
}

impl TryFrom<i8> for Gear {
    type Error = ShifterError;

    fn try_from(ordinal: i8) -> ShifterResult<Self> {
        Gear::ALL
            .into_iter()
            .find(|g| g.ordinal() == ordinal)
            .ok_or(ShifterError::InvalidGear(ordinal))
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => f.write_str("R"),
            other => write!(f, "{}", other.ordinal()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// A gate the stick can travel along. The reverse gate sits outside the
/// outer column on the reverse corner's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    ReverseGate,
    Left,
    Center,
    Right,
}

impl Column {
    /// Normalized x of the gate.
    pub fn x(self, reverse_side: Side) -> f64 {
        match self {
            Column::ReverseGate => reverse_side.sign(),
            Column::Left => -OUTER_COLUMN_X,
            Column::Center => 0.0,
            Column::Right => OUTER_COLUMN_X,
        }
    }
}

/// Row away from the neutral channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Row {
    Up,
    Down,
}

impl Row {
    pub fn sign(self) -> f64 {
        match self {
            Row::Up => 1.0,
            Row::Down => -1.0,
        }
    }

    pub fn from_z(z: f64) -> Self {
        if z >= 0.0 { Row::Up } else { Row::Down }
    }
}

/// Which corner of the H holds reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReverseCorner {
    TopLeft,
    #[default]
    BottomLeft,
    TopRight,
    BottomRight,
}

impl ReverseCorner {
    pub fn side(self) -> Side {
        match self {
            ReverseCorner::TopLeft | ReverseCorner::BottomLeft => Side::Left,
            ReverseCorner::TopRight | ReverseCorner::BottomRight => Side::Right,
        }
    }

    pub fn row(self) -> Row {
        match self {
            ReverseCorner::TopLeft | ReverseCorner::TopRight => Row::Up,
            ReverseCorner::BottomLeft | ReverseCorner::BottomRight => Row::Down,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReverseCorner::TopLeft => "Top Left",
            ReverseCorner::BottomLeft => "Bottom Left",
            ReverseCorner::TopRight => "Top Right",
            ReverseCorner::BottomRight => "Bottom Right",
        }
    }
}

impl fmt::Display for ReverseCorner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReverseCorner {
    type Err = ShifterError;

    /// Accepts `"Bottom Left"`, `"bottom_left"`, `"BottomLeft"` and so on.
    fn from_str(s: &str) -> ShifterResult<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "topleft" => Ok(ReverseCorner::TopLeft),
            "bottomleft" => Ok(ReverseCorner::BottomLeft),
            "topright" => Ok(ReverseCorner::TopRight),
            "bottomright" => Ok(ReverseCorner::BottomRight),
            _ => Err(ShifterError::InvalidReversePosition(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReverseCorner {
    type Error = ShifterError;

    fn try_from(s: String) -> ShifterResult<Self> {
        s.parse()
    }
}

impl From<ReverseCorner> for String {
    fn from(corner: ReverseCorner) -> Self {
        corner.as_str().to_string()
    }
}

/// One position of the gear grid.
///
/// `Neutral` is the channel between the rows, `InGate` the half-way point
/// toward a row, `Engaged` a fully selected gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridCell {
    Neutral(Column),
    InGate(Column, Row),
    Engaged(Gear),
}

impl Default for GridCell {
    fn default() -> Self {
        GridCell::Neutral(Column::Center)
    }
}

impl GridCell {
    pub fn gear(self) -> Option<Gear> {
        match self {
            GridCell::Engaged(g) => Some(g),
            GridCell::Neutral(_) | GridCell::InGate(..) => None,
        }
    }

    /// Gear ordinal, 0 when no gear is engaged.
    pub fn ordinal(self) -> i8 {
        self.gear().map_or(0, Gear::ordinal)
    }

    pub fn column(self) -> Column {
        match self {
            GridCell::Neutral(c) | GridCell::InGate(c, _) => c,
            GridCell::Engaged(g) => g.column(),
        }
    }

    /// Normalized knob coordinates `(x, z)` of this cell.
    pub fn position(self, corner: ReverseCorner) -> (f64, f64) {
        let x = self.column().x(corner.side());
        let z = match self {
            GridCell::Neutral(_) => 0.0,
            GridCell::InGate(_, row) => row.sign() * IN_GATE_Z,
            GridCell::Engaged(g) => g.row(corner).sign(),
        };
        (x, z)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridCell::Neutral(c) => write!(f, "N({c:?})"),
            GridCell::InGate(c, r) => write!(f, "gate({c:?}, {r:?})"),
            GridCell::Engaged(g) => write!(f, "{g}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftDirection {
    Up,
    Down,
}

/// Emitted when the engaged gear changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearChange {
    pub from: Option<Gear>,
    pub to: Option<Gear>,
    pub direction: ShiftDirection,
}

impl GearChange {
    /// `None` when both cells carry the same gear ordinal.
    pub fn between(from: GridCell, to: GridCell) -> Option<Self> {
        let direction = match to.ordinal().cmp(&from.ordinal()) {
            core::cmp::Ordering::Greater => ShiftDirection::Up,
            core::cmp::Ordering::Less => ShiftDirection::Down,
            core::cmp::Ordering::Equal => return None,
        };
        Some(Self {
            from: from.gear(),
            to: to.gear(),
            direction,
        })
    }
}
