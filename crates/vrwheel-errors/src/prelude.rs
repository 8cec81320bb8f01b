//! Convenient re-exports for crates that report errors.

pub use crate::common::{ErrorCategory, ErrorSeverity, VrWheelError};
pub use crate::decode::DecodeError;
pub use crate::validation::ValidationError;
pub use crate::{DecodeResult, Result};
