//! Rejected settings values.

use core::fmt;

use crate::common::ErrorSeverity;

/// Why a settings field was refused. Values are kept as text so one type
/// covers integers, floats and enum names alike.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} = {value} outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("{0} is NaN or infinite")]
    NotFinite(String),

    /// An enum-like field held an unknown name.
    #[error("{field}: unknown option '{value}' (choose from {expected})")]
    InvalidEnumValue {
        field: String,
        value: String,
        /// Human-readable list of accepted names.
        expected: String,
    },
}

impl ValidationError {
    /// Every rejected value is an `Error`: the field falls back to its default.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    pub fn not_finite(field: impl Into<String>) -> Self {
        ValidationError::NotFinite(field.into())
    }

    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidEnumValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidEnumValue { field, .. }
            | ValidationError::NotFinite(field) => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ValidationError::out_of_range("wheel_degrees", 10_000, 90, 3600);
        let msg = err.to_string();
        assert!(msg.contains("wheel_degrees"));
        assert!(msg.contains("10000"));
        assert!(msg.contains("90..=3600"));
        assert_eq!(err.field(), "wheel_degrees");
    }

    #[test]
    fn test_invalid_enum_message() {
        let err = ValidationError::invalid_enum(
            "shifter_reverse_orientation",
            "Middle",
            "Top Left, Bottom Left, Top Right, Bottom Right",
        );
        assert!(err.to_string().contains("'Middle'"));
        assert_eq!(err.field(), "shifter_reverse_orientation");
    }

    #[test]
    fn test_every_rejection_is_an_error() {
        assert_eq!(ValidationError::not_finite("wheel_size").severity(), ErrorSeverity::Error);
    }
}
