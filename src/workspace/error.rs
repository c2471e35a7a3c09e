use std::path::PathBuf;

use crate::deconv::DeconvError;

/// Errors that can occur during workspace operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing an experiment
    #[error("Parse error: {0}")]
    DeconvError(#[from] DeconvError),

    /// Error serializing/deserializing params.json
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// params.json could not be moved into place
    #[error("Failed to write params: {0}")]
    PersistError(#[from] tempfile::PersistError),

    /// A file expected in the workspace does not exist
    #[error("File not found in workspace: {0}")]
    MissingFile(PathBuf),

    /// The named workspace does not exist
    #[error("Workspace does not exist: {0}")]
    NotFound(String),

    /// Workspace name that is empty or not a single path component
    #[error("Invalid workspace name: '{0}'")]
    InvalidName(String),

    /// Unsupported `image-format` parameter
    #[error("Invalid image format '{0}', expected one of svg, png, jpeg, webp")]
    InvalidImageFormat(String),
}
