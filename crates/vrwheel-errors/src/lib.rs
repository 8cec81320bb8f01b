//! Centralized error types for the hand-tracked wheel engine.
//!
//! The error system is split by concern:
//!
//! - [`common`]: top-level error, category and severity
//! - [`decode`]: force-feedback wire decode failures (copyable, allocation free)
//! - [`validation`]: configuration value checks
//!
//! Frame-loop code never propagates these upward. Decoders return
//! [`DecodeError`] so the caller can count and drop the report; config
//! loading is the only path that surfaces errors to the operator.
//!
//! # Example
//!
//! ```
//! use vrwheel_errors::prelude::*;
//!
//! fn check_size(value: f32) -> Result<f32> {
//!     if !(0.05..=2.0).contains(&value) {
//!         return Err(ValidationError::out_of_range("wheel_size", value, 0.05, 2.0).into());
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check_size(0.48).is_ok());
//! assert!(check_size(5.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(rust_2018_idioms)]

pub mod common;
pub mod decode;
pub mod prelude;
pub mod validation;

pub use common::{ErrorCategory, ErrorSeverity, VrWheelError};
pub use decode::DecodeError;
pub use validation::ValidationError;

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, VrWheelError>;

/// A specialized `Result` type for wire decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
