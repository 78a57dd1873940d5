//! Configuration file handling for ~/.dockhand/config.ini.
//!
//! Loads user configuration with sensible defaults; a missing file is not
//! an error. Settings structs live in [`super::settings`], constants in
//! [`super::defaults`], and parsing in [`super::parser`].

use super::settings::ConfigFile;
use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// A key holds a value of the wrong shape.
    #[error("invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        /// Section the key lives in.
        section: String,
        /// Offending key.
        key: String,
        /// Offending value.
        value: String,
        /// What would have been acceptable.
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.dockhand/config.ini).
    ///
    /// Returns defaults if the file does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.dockhand).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dockhand")
}

/// Get the path to the config file (~/.dockhand/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            "[agent]\ninstance_id = i-deadbeef\n[pool]\ncancel_wait_ms = 250\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config.agent.instance_id, "i-deadbeef");
        assert_eq!(config.pool.cancel_wait_ms, 250);
    }

    #[test]
    fn test_config_file_path_ends_with_ini() {
        assert!(config_file_path().ends_with(".dockhand/config.ini"));
    }
}
