//! wfcmd Emitter
//!
//! Writes workflow command lines to the orchestrator:
//! - Directly on stdout, or through a child `echo` process
//! - Scoped helpers that always close what they open (groups, stop-commands)

pub mod emitter;
pub mod error;
pub mod scoped;
pub mod sink;

pub use emitter::Emitter;
pub use error::{EmitError, EmitResult};
pub use scoped::{generate_token, GroupGuard, StopCommandsGuard};
pub use sink::{EchoSink, LineSink, MemorySink, StdoutSink};
