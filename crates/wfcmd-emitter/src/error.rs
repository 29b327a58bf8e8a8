//! Emitter error types

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while writing command lines
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to write command: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Echo { program: String, status: ExitStatus },
}

/// Result type for emitter operations
pub type EmitResult<T> = Result<T, EmitError>;
