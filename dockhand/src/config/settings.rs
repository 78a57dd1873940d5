//! Configuration structs.
//!
//! Each struct groups one concern; `ConfigFile` is the whole file.

use super::defaults::*;
use std::path::PathBuf;

/// Identity of this agent: where documents live and which instance they
/// belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSettings {
    /// Root directory of the document store.
    pub data_root: PathBuf,

    /// The managed instance this agent serves.
    pub instance_id: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
        }
    }
}

/// Processor tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Workers in the command pool.
    pub command_workers: usize,

    /// Workers in the cancel pool.
    pub cancel_workers: usize,

    /// Recovery attempts before quarantine.
    pub retry_limit: u32,

    /// Soft-stop drain budget in milliseconds.
    pub soft_stop_timeout_ms: u64,

    /// Capacity of the shared result stream.
    pub result_channel_capacity: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            command_workers: DEFAULT_COMMAND_WORKERS,
            cancel_workers: DEFAULT_CANCEL_WORKERS,
            retry_limit: DEFAULT_RETRY_LIMIT,
            soft_stop_timeout_ms: DEFAULT_SOFT_STOP_TIMEOUT_MS,
            result_channel_capacity: DEFAULT_RESULT_CHANNEL_CAPACITY,
        }
    }
}

/// Worker pool tuning shared by both pools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// How long a submit may block on a full queue, in milliseconds.
    pub cancel_wait_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            cancel_wait_ms: DEFAULT_CANCEL_WAIT_MS,
        }
    }
}

/// Plugin output caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginSettings {
    /// Bytes of stdout kept per invocation.
    pub max_stdout_bytes: usize,

    /// Bytes of stderr kept per invocation.
    pub max_stderr_bytes: usize,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            max_stdout_bytes: DEFAULT_MAX_STDOUT_BYTES,
            max_stderr_bytes: DEFAULT_MAX_STDERR_BYTES,
        }
    }
}

/// Logging destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub log_dir: PathBuf,

    /// Log file name.
    pub log_file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// `[agent]` section.
    pub agent: AgentSettings,

    /// `[processor]` section.
    pub processor: ProcessorSettings,

    /// `[pool]` section.
    pub pool: PoolSettings,

    /// `[plugins]` section.
    pub plugins: PluginSettings,

    /// `[logging]` section.
    pub logging: LoggingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.agent.instance_id, DEFAULT_INSTANCE_ID);
        assert_eq!(config.processor.command_workers, DEFAULT_COMMAND_WORKERS);
        assert_eq!(config.processor.cancel_workers, DEFAULT_CANCEL_WORKERS);
        assert_eq!(config.pool.cancel_wait_ms, DEFAULT_CANCEL_WAIT_MS);
        assert_eq!(config.plugins.max_stdout_bytes, DEFAULT_MAX_STDOUT_BYTES);
        assert_eq!(config.logging.log_file, DEFAULT_LOG_FILE);
    }
}
