//! Centralized CLI error handling with user-friendly messages.

use dockhand::config::ConfigFileError;
use dockhand::store::StoreError;
use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file problem.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigFileError),

    /// Document store problem.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A flag or argument did not parse.
    #[error("{0}")]
    InvalidArgument(String),

    /// The requested document exists in no location.
    #[error("document {0} not found in any location")]
    DocumentNotFound(String),

    /// Serializing a document for display failed.
    #[error("failed to render document: {0}")]
    Render(#[from] serde_json::Error),
}
