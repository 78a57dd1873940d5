//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! Starts from defaults and overlays whatever the file provides, so a
//! partial config file is always valid.

use super::file::ConfigFileError;
use super::keys::*;
use super::settings::ConfigFile;
use ini::Ini;
use std::path::PathBuf;

/// Parse an `Ini` object into a `ConfigFile`.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some(SECTION_AGENT)) {
        if let Some(v) = section.get(KEY_DATA_ROOT) {
            let v = v.trim();
            if !v.is_empty() {
                config.agent.data_root = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get(KEY_INSTANCE_ID) {
            let v = v.trim();
            if !v.is_empty() {
                config.agent.instance_id = v.to_string();
            }
        }
    }

    if let Some(section) = ini.section(Some(SECTION_PROCESSOR)) {
        if let Some(v) = section.get(KEY_COMMAND_WORKERS) {
            config.processor.command_workers =
                parse_number(SECTION_PROCESSOR, KEY_COMMAND_WORKERS, v)?;
        }
        if let Some(v) = section.get(KEY_CANCEL_WORKERS) {
            config.processor.cancel_workers =
                parse_number(SECTION_PROCESSOR, KEY_CANCEL_WORKERS, v)?;
        }
        if let Some(v) = section.get(KEY_RETRY_LIMIT) {
            config.processor.retry_limit = parse_number(SECTION_PROCESSOR, KEY_RETRY_LIMIT, v)?;
        }
        if let Some(v) = section.get(KEY_SOFT_STOP_TIMEOUT_MS) {
            config.processor.soft_stop_timeout_ms =
                parse_number(SECTION_PROCESSOR, KEY_SOFT_STOP_TIMEOUT_MS, v)?;
        }
        if let Some(v) = section.get(KEY_RESULT_CHANNEL_CAPACITY) {
            config.processor.result_channel_capacity =
                parse_number(SECTION_PROCESSOR, KEY_RESULT_CHANNEL_CAPACITY, v)?;
        }
    }

    if let Some(section) = ini.section(Some(SECTION_POOL)) {
        if let Some(v) = section.get(KEY_CANCEL_WAIT_MS) {
            config.pool.cancel_wait_ms = parse_number(SECTION_POOL, KEY_CANCEL_WAIT_MS, v)?;
        }
    }

    if let Some(section) = ini.section(Some(SECTION_PLUGINS)) {
        if let Some(v) = section.get(KEY_MAX_STDOUT_BYTES) {
            config.plugins.max_stdout_bytes =
                parse_number(SECTION_PLUGINS, KEY_MAX_STDOUT_BYTES, v)?;
        }
        if let Some(v) = section.get(KEY_MAX_STDERR_BYTES) {
            config.plugins.max_stderr_bytes =
                parse_number(SECTION_PLUGINS, KEY_MAX_STDERR_BYTES, v)?;
        }
    }

    if let Some(section) = ini.section(Some(SECTION_LOGGING)) {
        if let Some(v) = section.get(KEY_LOG_DIR) {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.log_dir = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get(KEY_LOG_FILE) {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.log_file = v.to_string();
            }
        }
    }

    Ok(config)
}

/// Parses an integer-valued key, reporting the offending location on error.
fn parse_number<T: std::str::FromStr>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a non-negative integer".to_string(),
        })
}
