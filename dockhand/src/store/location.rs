//! The four lifecycle locations a document can occupy.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a document, realized as an on-disk directory.
///
/// Legal transitions are monotonic: `Pending → Current → Completed`,
/// with `Pending → Corrupt` and `Current → Corrupt` for quarantine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentLocation {
    /// Submitted but not yet picked up by a worker.
    Pending,

    /// Being executed, or interrupted mid-execution.
    Current,

    /// Finished; terminal.
    Completed,

    /// Quarantined; terminal.
    Corrupt,
}

impl DocumentLocation {
    /// All locations, in lifecycle order.
    pub const ALL: [DocumentLocation; 4] = [
        DocumentLocation::Pending,
        DocumentLocation::Current,
        DocumentLocation::Completed,
        DocumentLocation::Corrupt,
    ];

    /// The directory name for this location.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Current => "current",
            Self::Completed => "completed",
            Self::Corrupt => "corrupt",
        }
    }
}

impl std::fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl std::str::FromStr for DocumentLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "current" => Ok(Self::Current),
            "completed" => Ok(Self::Completed),
            "corrupt" => Ok(Self::Corrupt),
            other => Err(format!(
                "unknown location '{other}' (expected pending, current, completed or corrupt)"
            )),
        }
    }
}
