//! Geometry primitives shared by the wheel, shifter and handlebar trackers.
//!
//! Everything here is pure and allocation free apart from [`AngleHistory`],
//! which owns a fixed-capacity ring. Inverse trig is always clamped so that
//! tracking noise cannot produce NaN.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod angle;
pub mod collision;
pub mod shaping;
pub mod vec3;

pub use angle::*;
pub use collision::*;
pub use shaping::*;
pub use vec3::*;
