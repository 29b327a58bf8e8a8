//! Channel error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wfcmd_protocol::ProtocolError;

/// Errors raised while reading or writing channel files
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The variable naming the channel file is not set.
    #[error("Configuration error: {0}")]
    Config(#[from] wfcmd_core::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ChannelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChannelError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for a missing channel variable.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ChannelError::Config(_))
    }
}

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;
