//! Command emitter

use serde::Serialize;
use tracing::debug;
use wfcmd_core::{CommandsConfig, EnvStore};
use wfcmd_protocol::{make_string, AnnotationOptions, Command};

use crate::error::EmitResult;
use crate::sink::{EchoSink, LineSink, StdoutSink};

/// Writes workflow commands through a direct or a subprocess sink.
///
/// The subprocess sink is chosen when the call asks for it, or when the call
/// leaves it open and the process-wide toggle is set.
pub struct Emitter {
    config: CommandsConfig,
    direct: Box<dyn LineSink>,
    subprocess: Box<dyn LineSink>,
}

impl Emitter {
    /// Emitter writing to stdout, or through `echo` when configured.
    pub fn new(config: CommandsConfig) -> Self {
        Self::with_sinks(config, StdoutSink, EchoSink::new())
    }

    pub fn from_env(env: &impl EnvStore) -> Self {
        Self::new(CommandsConfig::from_env(env))
    }

    pub fn with_sinks(
        config: CommandsConfig,
        direct: impl LineSink + 'static,
        subprocess: impl LineSink + 'static,
    ) -> Self {
        Self {
            config,
            direct: Box::new(direct),
            subprocess: Box::new(subprocess),
        }
    }

    pub fn config(&self) -> &CommandsConfig {
        &self.config
    }

    /// Encode and write one command.
    ///
    /// `use_subprocess` overrides the process-wide toggle when set.
    pub fn emit(&mut self, command: &Command, use_subprocess: Option<bool>) -> EmitResult<()> {
        self.write_line(&command.encode(), use_subprocess)
    }

    /// Write a plain, unescaped line.
    pub fn echo<T: Serialize + ?Sized>(
        &mut self,
        message: &T,
        use_subprocess: Option<bool>,
    ) -> EmitResult<()> {
        self.write_line(&make_string(message), use_subprocess)
    }

    pub fn debug(&mut self, message: &str, use_subprocess: Option<bool>) -> EmitResult<()> {
        self.emit(&Command::debug(message), use_subprocess)
    }

    pub fn notice(
        &mut self,
        message: &str,
        options: AnnotationOptions,
        use_subprocess: Option<bool>,
    ) -> EmitResult<()> {
        self.emit(&Command::notice(message, options), use_subprocess)
    }

    pub fn warning(
        &mut self,
        message: &str,
        options: AnnotationOptions,
        use_subprocess: Option<bool>,
    ) -> EmitResult<()> {
        self.emit(&Command::warning(message, options), use_subprocess)
    }

    pub fn error(
        &mut self,
        message: &str,
        options: AnnotationOptions,
        use_subprocess: Option<bool>,
    ) -> EmitResult<()> {
        self.emit(&Command::error(message, options), use_subprocess)
    }

    /// Stop a value from being printed in the log.
    pub fn add_mask<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
        use_subprocess: Option<bool>,
    ) -> EmitResult<()> {
        self.emit(&Command::add_mask(value), use_subprocess)
    }

    pub fn start_group(&mut self, title: &str, use_subprocess: Option<bool>) -> EmitResult<()> {
        self.emit(&Command::group(title), use_subprocess)
    }

    pub fn end_group(&mut self, use_subprocess: Option<bool>) -> EmitResult<()> {
        self.emit(&Command::end_group(), use_subprocess)
    }

    fn write_line(&mut self, line: &str, use_subprocess: Option<bool>) -> EmitResult<()> {
        let subprocess = self.config.resolve_subprocess(use_subprocess);
        debug!(line, subprocess, "Emitting line");

        if subprocess {
            self.subprocess.write_line(line)
        } else {
            self.direct.write_line(line)
        }
    }
}
