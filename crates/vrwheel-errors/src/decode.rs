//! Force-feedback wire decode errors.
//!
//! These run on the driver callback thread, so they are `Copy` and carry
//! fixed numeric codes for cheap counting and logging.

use crate::common::ErrorSeverity;

/// Reasons a feedback report could not be turned into a typed record.
///
/// # Examples
///
/// ```
/// use vrwheel_errors::{DecodeError, ErrorSeverity};
///
/// let err = DecodeError::UnknownReportType(0x09);
/// assert_eq!(err.code(), 3);
/// assert_eq!(err.severity(), ErrorSeverity::Info);
/// assert!(!err.is_malformed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DecodeError {
    /// Packet shorter than its header or its declared size
    #[error("packet header invalid: declared {declared} bytes, received {received}")]
    BadHeader {
        /// Size field from the header
        declared: u32,
        /// Bytes actually present
        received: usize,
    },

    /// A required field ran past the end of the payload
    #[error("report truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the field required
        needed: usize,
        /// Bytes remaining
        available: usize,
    },

    /// Report type not handled by this decoder
    #[error("unhandled report type 0x{0:02x}")]
    UnknownReportType(u8),

    /// Recognized report carrying an undefined enumerated value
    #[error("invalid value {value} for field {field}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Raw value
        value: i64,
    },

    /// Header command is neither a report write nor a feature set
    #[error("unexpected driver command 0x{0:08x}")]
    UnknownCommand(u32),
}

impl DecodeError {
    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            DecodeError::BadHeader { .. } => 1,
            DecodeError::Truncated { .. } => 2,
            DecodeError::UnknownReportType(_) => 3,
            DecodeError::InvalidField { .. } => 4,
            DecodeError::UnknownCommand(_) => 5,
        }
    }

    /// Traffic we do not act on is expected; everything else is a
    /// malformed report.
    pub fn severity(self) -> ErrorSeverity {
        if self.is_malformed() {
            ErrorSeverity::Warning
        } else {
            ErrorSeverity::Info
        }
    }

    /// True when a recognized report could not be decoded.
    pub fn is_malformed(self) -> bool {
        !matches!(
            self,
            DecodeError::UnknownReportType(_) | DecodeError::UnknownCommand(_)
        )
    }
}
