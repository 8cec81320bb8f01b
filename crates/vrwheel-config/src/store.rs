//! JSON load and save.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::types::SimConfig;
use crate::{ConfigError, ConfigResult};

pub const DEFAULT_CONFIG_NAME: &str = "config.json";

impl SimConfig {
    /// Parse, normalize and validate a settings document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON or wrong value types,
    /// [`ConfigError::Invalid`] with every rejected value otherwise.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let mut config: SimConfig = serde_json::from_str(text)?;
        if config.normalize() {
            warn!(pitch = config.wheel.pitch, "wheel pitch clamped");
        }
        let errors = config.validate();
        if !errors.is_empty() {
            for e in &errors {
                warn!(error = %e, "config value rejected");
            }
            return Err(ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path`, or write and return the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load) and [`save`](Self::save).
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config found, writing defaults");
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Write pretty JSON through a temporary sibling so a crash never
    /// leaves a half-written file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}
