//! Deflection to grid-cell resolution.
//!
//! The stick moves freely along x only inside the neutral channel
//! (`|z| < middle`). Outside it the column is frozen and `z` alone picks the
//! row: past `end` the gear engages, and an engaged gear holds until `|z|`
//! falls below `end - row_hysteresis`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Column, Gear, GridCell, ReverseCorner, Row, ShiftDirection};

/// Normalized stick deflection, each component in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deflection {
    pub x: f64,
    pub z: f64,
}

impl Deflection {
    /// Clamp into `[-1, 1]`; non-finite components become 0.
    pub fn new(x: f64, z: f64) -> Self {
        fn sanitize(v: f64) -> f64 {
            if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
        }
        Self {
            x: sanitize(x),
            z: sanitize(z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMargins {
    /// Half-width of the neutral channel.
    pub middle: f64,
    /// Depth at which a gear engages.
    pub end: f64,
    pub row_hysteresis: f64,
    /// Boundary between the center and outer columns.
    pub column: f64,
    /// Travel needed to enter the reverse gate.
    pub reverse: f64,
}

impl Default for GridMargins {
    fn default() -> Self {
        Self {
            middle: 0.3,
            end: 0.8,
            row_hysteresis: 0.1,
            column: 1.0 / 3.0,
            reverse: 0.95,
        }
    }
}

/// Stateless H-pattern resolver.
///
/// # Examples
///
/// ```
/// use vrwheel_shifter::{Deflection, Gear, GridCell, GridResolver};
///
/// let grid = GridResolver::default();
/// let cell = grid.resolve(GridCell::default(), Deflection::new(0.0, 0.9), false);
/// assert_eq!(cell, GridCell::Engaged(Gear::Third));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridResolver {
    pub margins: GridMargins,
    pub corner: ReverseCorner,
}

impl GridResolver {
    pub fn new(margins: GridMargins, corner: ReverseCorner) -> Self {
        Self { margins, corner }
    }

    /// Column selected by `x` inside the neutral channel.
    pub fn column_for(&self, x: f64, unlocked: bool) -> Column {
        let toward_reverse = x * self.corner.side().sign();
        if unlocked && toward_reverse >= self.margins.reverse {
            Column::ReverseGate
        } else if x <= -self.margins.column {
            Column::Left
        } else if x >= self.margins.column {
            Column::Right
        } else {
            Column::Center
        }
    }

    /// Next cell given the previous one and this frame's deflection.
    pub fn resolve(&self, prev: GridCell, deflection: Deflection, unlocked: bool) -> GridCell {
        let d = Deflection::new(deflection.x, deflection.z);
        let depth = d.z.abs();
        let m = &self.margins;

        if depth < m.middle {
            return GridCell::Neutral(self.column_for(d.x, unlocked));
        }

        let column = prev.column();
        let row = Row::from_z(d.z);
        let target = match column {
            Column::ReverseGate if row == self.corner.row() => Gear::Reverse,
            // The reverse gate has no gear on its other row.
            Column::ReverseGate => return GridCell::Neutral(Column::ReverseGate),
            _ => match Gear::at(column, row) {
                Some(gear) => gear,
                None => return GridCell::Neutral(column),
            },
        };

        let already = prev == GridCell::Engaged(target);
        let holds = already && depth >= m.end - m.row_hysteresis;
        let may_engage = target != Gear::Reverse || unlocked || already;
        if (depth >= m.end && may_engage) || holds {
            GridCell::Engaged(target)
        } else {
            if target == Gear::Reverse && depth >= m.end {
                trace!("reverse engage blocked by lock");
            }
            GridCell::InGate(column, row)
        }
    }
}

/// Up/down gate for sequential mode. A shift fires once per push past the
/// end margin; the stick must come back into the neutral channel to re-arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialGate {
    armed: bool,
}

impl Default for SequentialGate {
    fn default() -> Self {
        Self { armed: true }
    }
}

impl SequentialGate {
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn reset(&mut self) {
        self.armed = true;
    }

    pub fn update(&mut self, z: f64, margins: &GridMargins) -> Option<ShiftDirection> {
        let z = Deflection::new(0.0, z).z;
        if !self.armed {
            if z.abs() < margins.middle {
                self.armed = true;
            }
            return None;
        }
        let direction = if z >= margins.end {
            ShiftDirection::Up
        } else if z <= -margins.end {
            ShiftDirection::Down
        } else {
            return None;
        };
        self.armed = false;
        Some(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridResolver {
        GridResolver::default()
    }

    fn run(grid: &GridResolver, path: &[(f64, f64)], unlocked: bool) -> GridCell {
        path.iter().fold(GridCell::default(), |cell, &(x, z)| {
            grid.resolve(cell, Deflection::new(x, z), unlocked)
        })
    }

    #[test]
    fn test_center_column_up_engages_third() {
        let g = grid();
        assert_eq!(run(&g, &[(0.0, 0.9)], false), GridCell::Engaged(Gear::Third));
    }

    #[test]
    fn test_in_gate_between_margins() {
        let g = grid();
        assert_eq!(
            run(&g, &[(0.0, -0.5)], false),
            GridCell::InGate(Column::Center, Row::Down)
        );
    }

    #[test]
    fn test_column_frozen_outside_channel() {
        let g = grid();
        // Select left column, push up, then swing x hard right while in gear.
        let cell = run(&g, &[(-0.7, 0.0), (-0.7, 0.9), (0.9, 0.9)], false);
        assert_eq!(cell, GridCell::Engaged(Gear::First));
    }

    #[test]
    fn test_engaged_gear_has_hysteresis() {
        let g = grid();
        let cell = run(&g, &[(0.7, 0.0), (0.7, -0.85), (0.7, -0.75)], false);
        assert_eq!(cell, GridCell::Engaged(Gear::Sixth));
        let cell = run(&g, &[(0.7, 0.0), (0.7, -0.85), (0.7, -0.65)], false);
        assert_eq!(cell, GridCell::InGate(Column::Right, Row::Down));
    }

    #[test]
    fn test_in_gate_does_not_engage_below_end() {
        let g = grid();
        let cell = run(&g, &[(0.0, 0.5), (0.0, 0.75)], false);
        assert_eq!(cell, GridCell::InGate(Column::Center, Row::Up));
    }

    #[test]
    fn test_reverse_needs_unlock() {
        let g = grid();
        let locked = run(&g, &[(-1.0, 0.0), (-1.0, -1.0)], false);
        assert_eq!(locked, GridCell::Engaged(Gear::Second));
        let unlocked = run(&g, &[(-1.0, 0.0), (-1.0, -1.0)], true);
        assert_eq!(unlocked, GridCell::Engaged(Gear::Reverse));
    }

    #[test]
    fn test_reverse_gate_other_row_is_blocked() {
        let g = grid();
        let cell = run(&g, &[(-1.0, 0.0), (-1.0, 1.0)], true);
        assert_eq!(cell, GridCell::Neutral(Column::ReverseGate));
    }

    #[test]
    fn test_reverse_holds_after_trigger_release() {
        let g = grid();
        let engaged = run(&g, &[(-1.0, 0.0), (-1.0, -1.0)], true);
        let held = g.resolve(engaged, Deflection::new(-1.0, -1.0), false);
        assert_eq!(held, GridCell::Engaged(Gear::Reverse));
    }

    #[test]
    fn test_reverse_reentry_needs_unlock() {
        let g = grid();
        let engaged = run(&g, &[(-1.0, 0.0), (-1.0, -1.0)], true);
        let gate = g.resolve(engaged, Deflection::new(-1.0, -0.5), false);
        assert_eq!(gate, GridCell::InGate(Column::ReverseGate, Row::Down));
        let again = g.resolve(gate, Deflection::new(-1.0, -1.0), false);
        assert_eq!(again, GridCell::InGate(Column::ReverseGate, Row::Down));
    }

    #[test]
    fn test_right_side_reverse_corner() {
        let g = GridResolver::new(GridMargins::default(), ReverseCorner::TopRight);
        let cell = run(&g, &[(1.0, 0.0), (1.0, 1.0)], true);
        assert_eq!(cell, GridCell::Engaged(Gear::Reverse));
        // Fifth stays reachable in its own column.
        let cell = run(&g, &[(0.7, 0.0), (0.7, 1.0)], true);
        assert_eq!(cell, GridCell::Engaged(Gear::Fifth));
    }

    #[test]
    fn test_nan_deflection_resolves_to_neutral() {
        let g = grid();
        let cell = g.resolve(
            GridCell::Engaged(Gear::Third),
            Deflection::new(f64::NAN, f64::NAN),
            false,
        );
        assert_eq!(cell, GridCell::Neutral(Column::Center));
    }

    #[test]
    fn test_sequential_gate_fires_once_per_push() {
        let m = GridMargins::default();
        let mut gate = SequentialGate::default();
        assert_eq!(gate.update(0.9, &m), Some(ShiftDirection::Up));
        assert_eq!(gate.update(0.95, &m), None);
        assert_eq!(gate.update(0.5, &m), None);
        assert!(!gate.is_armed());
        assert_eq!(gate.update(0.1, &m), None);
        assert!(gate.is_armed());
        assert_eq!(gate.update(-0.85, &m), Some(ShiftDirection::Down));
    }
}
