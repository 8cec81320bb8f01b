//! Settings model and persistence
//!
//! [`SimConfig`] keeps the flat key layout of the legacy `config.json`
//! (`wheel_size`, `shifter_degree`, ...) so existing files load unchanged.
//! Every key is optional; missing keys take their defaults.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod store;
pub mod types;
pub mod validation;

pub use store::*;
pub use types::*;
pub use validation::*;

use std::path::PathBuf;

use thiserror::Error;
use vrwheel_errors::{ValidationError, VrWheelError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config rejected: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConfigError> for VrWheelError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { source, .. } => VrWheelError::Io(source),
            ConfigError::Invalid(mut errors) if errors.len() == 1 => match errors.pop() {
                Some(single) => VrWheelError::Validation(single),
                None => VrWheelError::config("empty validation error list"),
            },
            other => VrWheelError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrwheel_errors::ErrorCategory;

    #[test]
    fn test_single_validation_error_keeps_category() {
        let err = ConfigError::Invalid(vec![ValidationError::not_finite("wheel_pitch")]);
        let top: VrWheelError = err.into();
        assert_eq!(top.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_many_validation_errors_become_config_error() {
        let err = ConfigError::Invalid(vec![
            ValidationError::not_finite("wheel_pitch"),
            ValidationError::not_finite("wheel_size"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("wheel_pitch") && msg.contains("wheel_size"));
        let top: VrWheelError = err.into();
        assert_eq!(top.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_io_error_maps_to_io() {
        let err = ConfigError::Io {
            path: PathBuf::from("/nope/config.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope/config.json"));
        let top: VrWheelError = err.into();
        assert_eq!(top.category(), ErrorCategory::IO);
    }
}
