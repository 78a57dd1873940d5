//! Default configuration values.
//!
//! Single source of truth for every tunable; the settings structs and the
//! INI parser both defer here.

/// Workers in the command pool.
pub const DEFAULT_COMMAND_WORKERS: usize = 5;

/// Workers in the cancel pool. Cancels are tiny probes; one worker keeps
/// them strictly ordered.
pub const DEFAULT_CANCEL_WORKERS: usize = 1;

/// Recovery attempts before a document is quarantined.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Drain budget for a soft stop, in milliseconds.
pub const DEFAULT_SOFT_STOP_TIMEOUT_MS: u64 = 20_000;

/// How long a submit may block on a full queue, in milliseconds.
pub const DEFAULT_CANCEL_WAIT_MS: u64 = 10_000;

/// Capacity of the shared result stream.
pub const DEFAULT_RESULT_CHANNEL_CAPACITY: usize = 64;

/// Bytes of stdout kept per plugin invocation.
pub const DEFAULT_MAX_STDOUT_BYTES: usize = 24_000;

/// Bytes of stderr kept per plugin invocation.
pub const DEFAULT_MAX_STDERR_BYTES: usize = 8_000;

/// Root of the on-disk document store.
pub const DEFAULT_DATA_ROOT: &str = "/var/lib/dockhand";

/// Instance id used when none is configured.
pub const DEFAULT_INSTANCE_ID: &str = "local";

/// Directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log file name.
pub const DEFAULT_LOG_FILE: &str = "dockhand.log";
