//! Hand-driven gear shifter for VR racing
//!
//! A hand grabs the knob, its motion is turned into a normalized stick
//! deflection, and the deflection is resolved against an H-pattern gear
//! grid (or a sequential up/down gate). The crate has no I/O; the caller
//! publishes [`ShifterButtons`] and forwards [`ShifterEvent`]s.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod grid;
pub mod shifter;
pub mod stick;
pub mod types;

pub use grid::*;
pub use shifter::*;
pub use stick::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShifterError {
    #[error("Invalid gear ordinal: {0}")]
    InvalidGear(i8),

    #[error("Unknown reverse position '{0}'")]
    InvalidReversePosition(String),
}

pub type ShifterResult<T> = Result<T, ShifterError>;
