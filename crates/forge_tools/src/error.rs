//! Error types for the tools.

use std::path::PathBuf;

use forge_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors reported by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The engine rejected the rules or a request.
    #[error(transparent)]
    Game(#[from] GameError),

    /// No ruleset files were found.
    #[error("No .ron files in '{}'", .0.display())]
    NoRulesets(PathBuf),

    /// A report could not be serialized.
    #[error("Failed to write report: {0}")]
    Report(String),
}
