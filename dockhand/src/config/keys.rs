//! INI section and key names.
//!
//! Kept in one place so the parser and documentation cannot drift apart.

pub(super) const SECTION_AGENT: &str = "agent";
pub(super) const KEY_DATA_ROOT: &str = "data_root";
pub(super) const KEY_INSTANCE_ID: &str = "instance_id";

pub(super) const SECTION_PROCESSOR: &str = "processor";
pub(super) const KEY_COMMAND_WORKERS: &str = "command_workers";
pub(super) const KEY_CANCEL_WORKERS: &str = "cancel_workers";
pub(super) const KEY_RETRY_LIMIT: &str = "retry_limit";
pub(super) const KEY_SOFT_STOP_TIMEOUT_MS: &str = "soft_stop_timeout_ms";
pub(super) const KEY_RESULT_CHANNEL_CAPACITY: &str = "result_channel_capacity";

pub(super) const SECTION_POOL: &str = "pool";
pub(super) const KEY_CANCEL_WAIT_MS: &str = "cancel_wait_ms";

pub(super) const SECTION_PLUGINS: &str = "plugins";
pub(super) const KEY_MAX_STDOUT_BYTES: &str = "max_stdout_bytes";
pub(super) const KEY_MAX_STDERR_BYTES: &str = "max_stderr_bytes";

pub(super) const SECTION_LOGGING: &str = "logging";
pub(super) const KEY_LOG_DIR: &str = "log_dir";
pub(super) const KEY_LOG_FILE: &str = "log_file";
