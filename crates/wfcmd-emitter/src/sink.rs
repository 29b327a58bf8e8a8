//! Line sinks

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{EmitError, EmitResult};

/// Destination for encoded command lines
pub trait LineSink {
    /// Write one line; the sink adds the line terminator.
    fn write_line(&mut self, line: &str) -> EmitResult<()>;
}

/// Writes to the process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> EmitResult<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}

/// Hands each line to a child `echo` process sharing our stdout.
///
/// Some runners treat a child's output differently from writes made by the
/// step process itself.
#[derive(Debug, Clone)]
pub struct EchoSink {
    program: String,
}

impl EchoSink {
    pub fn new() -> Self {
        Self::with_program("echo")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for EchoSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for EchoSink {
    fn write_line(&mut self, line: &str) -> EmitResult<()> {
        // Flush our own buffered output first so ordering is preserved
        io::stdout().flush()?;

        let status = Command::new(&self.program)
            .arg(line)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| EmitError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EmitError::Echo {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Collects lines in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> EmitResult<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write_line("::debug::one").unwrap();
        writer.write_line("::debug::two").unwrap();

        assert_eq!(sink.lines(), vec!["::debug::one", "::debug::two"]);
        sink.clear();
        assert!(writer.lines().is_empty());
    }

    #[test]
    fn test_echo_sink_missing_program() {
        let mut sink = EchoSink::with_program("/nonexistent/wfcmd-echo");
        let err = sink.write_line("::debug::x").unwrap_err();
        assert!(matches!(err, EmitError::Spawn { ref program, .. } if program == "/nonexistent/wfcmd-echo"));
    }

    #[cfg(unix)]
    #[test]
    fn test_echo_sink_failing_program() {
        let mut sink = EchoSink::with_program("false");
        let err = sink.write_line("ignored").unwrap_err();
        assert!(matches!(err, EmitError::Echo { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_echo_sink_runs_program() {
        let mut sink = EchoSink::with_program("true");
        sink.write_line("::debug::through a child").unwrap();
        assert_eq!(sink.program(), "true");
    }
}
