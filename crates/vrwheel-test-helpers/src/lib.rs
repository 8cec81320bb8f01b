//! Shared test utilities for the hand-tracked wheel engine.
//!
//! - [`assert_approx_eq!`] compares floats with an explicit tolerance
//! - [`fixtures`] builds FFB packets and points on the wheel rim
//!
//! ```toml
//! [dev-dependencies]
//! vrwheel-test-helpers = { workspace = true }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

mod assertions;
pub mod fixtures;

pub use fixtures::{FfbPacket, ring_point};
