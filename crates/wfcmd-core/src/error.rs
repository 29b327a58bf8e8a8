//! Error types for wfcmd Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required path or environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
}

/// Result type alias for wfcmd Core operations
pub type Result<T> = std::result::Result<T, Error>;
