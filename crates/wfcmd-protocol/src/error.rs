//! Protocol error types

use thiserror::Error;

/// Protocol-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Value for {key} collides with the block delimiter")]
    DelimiterCollision { key: String },
}

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
