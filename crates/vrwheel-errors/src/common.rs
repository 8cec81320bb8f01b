//! `VrWheelError` and the category/severity tags used when logging it.

use core::fmt;

use crate::{DecodeError, ValidationError};

/// Any failure surfaced by a vrwheel crate.
#[derive(Debug, thiserror::Error)]
pub enum VrWheelError {
    /// An FFB packet did not decode.
    #[error("FFB packet rejected: {0}")]
    Decode(#[from] DecodeError),

    #[error("bad setting: {0}")]
    Validation(#[from] ValidationError),

    #[error("file access failed: {0}")]
    Io(#[source] std::io::Error),

    /// Settings file unreadable, unparsable or unwritable.
    #[error("settings: {0}")]
    Config(String),

    /// The pose source or virtual controller went away.
    #[error("device lost: {0}")]
    Device(String),
}

impl VrWheelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VrWheelError::Decode(_) => ErrorCategory::Decode,
            VrWheelError::Validation(_) => ErrorCategory::Validation,
            VrWheelError::Io(_) => ErrorCategory::IO,
            VrWheelError::Config(_) => ErrorCategory::Config,
            VrWheelError::Device(_) => ErrorCategory::Device,
        }
    }

    /// Decode and validation errors carry their own severity; losing a
    /// device stops the frame loop.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VrWheelError::Decode(e) => e.severity(),
            VrWheelError::Validation(e) => e.severity(),
            VrWheelError::Io(_) | VrWheelError::Config(_) => ErrorSeverity::Error,
            VrWheelError::Device(_) => ErrorSeverity::Critical,
        }
    }

    /// True when the loop can log and keep going.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    pub fn config(msg: impl Into<String>) -> Self {
        VrWheelError::Config(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        VrWheelError::Device(msg.into())
    }
}

impl From<std::io::Error> for VrWheelError {
    fn from(e: std::io::Error) -> Self {
        VrWheelError::Io(e)
    }
}

/// Which subsystem an error came from; logged as a lowercase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    Decode = 0,
    Validation = 1,
    IO = 2,
    Config = 3,
    Device = 4,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Decode => "decode",
            ErrorCategory::Validation => "validation",
            ErrorCategory::IO => "io",
            ErrorCategory::Config => "config",
            ErrorCategory::Device => "device",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from harmless to fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Expected noise, such as an FFB report type we do not model.
    Info = 0,
    Warning = 1,
    /// The operation was abandoned.
    Error = 2,
    /// The frame loop has to stop.
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Critical => "fatal",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_follows_variant() {
        let err = VrWheelError::from(DecodeError::Truncated {
            needed: 2,
            available: 1,
        });
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert_eq!(VrWheelError::config("x").category(), ErrorCategory::Config);
        assert_eq!(ErrorCategory::IO.to_string(), "io");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Critical.to_string(), "fatal");
    }

    #[test]
    fn test_device_errors_are_not_recoverable() {
        assert!(!VrWheelError::device("pose source gone").is_recoverable());
        assert!(VrWheelError::config("bad json").is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VrWheelError = io.into();
        assert_eq!(err.category(), ErrorCategory::IO);
        assert!(err.to_string().contains("missing"));
    }
}
