//! Document and plugin status values.
//!
//! Statuses are shared between the per-plugin result slots and the
//! document-level aggregate. They serialize as plain strings because the
//! on-disk document files are a stable contract inspected by external
//! tooling.

use serde::{Deserialize, Serialize};

/// Execution status of a document or a single plugin invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Execution has started but not yet reached a terminal state.
    #[default]
    InProgress,

    /// Completed successfully.
    Success,

    /// Completed with at least one failure.
    Failed,

    /// Stopped by a user-initiated cancel.
    Cancelled,

    /// A plugin exceeded its own execution deadline.
    TimedOut,

    /// Completed successfully and requested a host reboot before the
    /// remaining plugins may run.
    SuccessAndReboot,

    /// Stopped by an orderly processor shutdown (distinct from Cancelled so
    /// plugins can tell the two apart).
    Shutdown,
}

impl DocumentStatus {
    /// Returns true if this status is terminal (execution is over).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Severity rank used when folding plugin statuses into a document
    /// aggregate. Lower rank is worse; the aggregate is the minimum rank
    /// observed across all plugin results.
    fn severity_rank(&self) -> u8 {
        match self {
            Self::Failed => 0,
            Self::TimedOut => 1,
            Self::Cancelled => 2,
            Self::Shutdown => 3,
            Self::SuccessAndReboot => 4,
            Self::InProgress => 5,
            Self::Success => 6,
        }
    }

    /// Returns the worse of two statuses under the aggregate ordering.
    pub fn worst(self, other: Self) -> Self {
        if other.severity_rank() < self.severity_rank() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::TimedOut => write!(f, "TimedOut"),
            Self::SuccessAndReboot => write!(f, "SuccessAndReboot"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// The kind of work a document describes.
///
/// The processor filters recovery and submission by its supported set; a
/// document of an unsupported type is assumed to belong to a processor in
/// a different domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// An ordered list of plugin invocations to run once.
    SendCommand,

    /// A probe that cancels a previously submitted SendCommand.
    CancelCommand,

    /// A recurring document tied to an association.
    Association,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendCommand => write!(f, "SendCommand"),
            Self::CancelCommand => write!(f, "CancelCommand"),
            Self::Association => write!(f, "Association"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_in_progress() {
        assert_eq!(DocumentStatus::default(), DocumentStatus::InProgress);
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(!DocumentStatus::InProgress.is_terminal());
        assert!(DocumentStatus::Success.is_terminal());
        assert!(DocumentStatus::Failed.is_terminal());
        assert!(DocumentStatus::Cancelled.is_terminal());
        assert!(DocumentStatus::TimedOut.is_terminal());
        assert!(DocumentStatus::SuccessAndReboot.is_terminal());
        assert!(DocumentStatus::Shutdown.is_terminal());
    }

    #[test]
    fn test_status_worst_prefers_failure() {
        assert_eq!(
            DocumentStatus::Success.worst(DocumentStatus::Failed),
            DocumentStatus::Failed
        );
        assert_eq!(
            DocumentStatus::Failed.worst(DocumentStatus::Success),
            DocumentStatus::Failed
        );
    }

    #[test]
    fn test_status_worst_ordering() {
        // Worst to best: Failed, TimedOut, Cancelled, Shutdown,
        // SuccessAndReboot, InProgress, Success.
        let ordering = [
            DocumentStatus::Failed,
            DocumentStatus::TimedOut,
            DocumentStatus::Cancelled,
            DocumentStatus::Shutdown,
            DocumentStatus::SuccessAndReboot,
            DocumentStatus::InProgress,
            DocumentStatus::Success,
        ];
        for (i, worse) in ordering.iter().enumerate() {
            for better in &ordering[i..] {
                assert_eq!(worse.worst(*better), *worse);
                assert_eq!(better.worst(*worse), *worse);
            }
        }
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&DocumentStatus::SuccessAndReboot).unwrap();
        assert_eq!(json, "\"SuccessAndReboot\"");

        let parsed: DocumentStatus = serde_json::from_str("\"Shutdown\"").unwrap();
        assert_eq!(parsed, DocumentStatus::Shutdown);
    }

    #[test]
    fn test_document_type_display() {
        assert_eq!(format!("{}", DocumentType::SendCommand), "SendCommand");
        assert_eq!(format!("{}", DocumentType::CancelCommand), "CancelCommand");
    }
}
