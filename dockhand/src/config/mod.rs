//! Configuration for the dockhand agent.
//!
//! Settings load from `~/.dockhand/config.ini`; every key is optional and
//! falls back to the defaults in [`defaults`]. The file looks like:
//!
//! ```ini
//! [agent]
//! data_root = /var/lib/dockhand
//! instance_id = i-0abc123
//!
//! [processor]
//! command_workers = 5
//! cancel_workers = 1
//! retry_limit = 5
//! soft_stop_timeout_ms = 20000
//!
//! [pool]
//! cancel_wait_ms = 10000
//!
//! [plugins]
//! max_stdout_bytes = 24000
//! max_stderr_bytes = 8000
//!
//! [logging]
//! log_dir = logs
//! log_file = dockhand.log
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AgentSettings, ConfigFile, LoggingSettings, PluginSettings, PoolSettings, ProcessorSettings,
};
