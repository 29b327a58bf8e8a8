//! Workflow command types

use std::fmt;

use serde::Serialize;

use crate::encode::{build_command_line, build_options_string};
use crate::escape::make_string;

/// Opens and closes the command name on a line.
pub const COMMAND_MARKER: &str = "::";

/// Location and title options shared by `notice`, `warning` and `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationOptions {
    /// Custom title
    pub title: Option<String>,
    /// Filename in the repository
    pub file: Option<String>,
    /// Column number, starting at 1
    pub col: Option<u32>,
    pub end_column: Option<u32>,
    /// Line number, starting at 1
    pub line: Option<u32>,
    pub end_line: Option<u32>,
}

impl AnnotationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn col(mut self, col: u32) -> Self {
        self.col = Some(col);
        self
    }

    pub fn end_column(mut self, end_column: u32) -> Self {
        self.end_column = Some(end_column);
        self
    }

    pub fn line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn end_line(mut self, end_line: u32) -> Self {
        self.end_line = Some(end_line);
        self
    }

    /// Options in wire order: title, file, col, end_column, line, end_line.
    pub fn entries(&self) -> [(&'static str, Option<String>); 6] {
        [
            ("title", self.title.clone()),
            ("file", self.file.clone()),
            ("col", self.col.map(|v| v.to_string())),
            ("end_column", self.end_column.map(|v| v.to_string())),
            ("line", self.line.map(|v| v.to_string())),
            ("end_line", self.end_line.map(|v| v.to_string())),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none())
    }
}

/// All supported workflow commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// ::debug::<message>
    Debug,

    /// ::notice <options>::<message>
    Notice(AnnotationOptions),

    /// ::warning <options>::<message>
    Warning(AnnotationOptions),

    /// ::error <options>::<message>
    Error(AnnotationOptions),

    /// ::group::<title>
    Group,

    /// ::endgroup::
    EndGroup,

    /// ::add-mask::<value>
    AddMask,

    /// ::stop-commands::<token>
    StopCommands,

    /// ::<token>::
    ResumeCommands(String),
}

impl CommandKind {
    /// Name written between the leading markers.
    pub fn name(&self) -> &str {
        match self {
            CommandKind::Debug => "debug",
            CommandKind::Notice(_) => "notice",
            CommandKind::Warning(_) => "warning",
            CommandKind::Error(_) => "error",
            CommandKind::Group => "group",
            CommandKind::EndGroup => "endgroup",
            CommandKind::AddMask => "add-mask",
            CommandKind::StopCommands => "stop-commands",
            CommandKind::ResumeCommands(token) => token,
        }
    }

    /// Whether the message is data-escaped on encode.
    ///
    /// Log and group text goes out verbatim; the orchestrator renders it as is.
    pub fn escapes_message(&self) -> bool {
        matches!(self, CommandKind::AddMask)
    }

    pub fn options_string(&self) -> String {
        match self {
            CommandKind::Notice(options)
            | CommandKind::Warning(options)
            | CommandKind::Error(options) => build_options_string(options.entries()),
            _ => String::new(),
        }
    }
}

/// A single workflow command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub message: String,
}

impl Command {
    pub fn new(kind: CommandKind, message: impl Into<String>) -> Self {
        Command {
            kind,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Command::new(CommandKind::Debug, message)
    }

    pub fn notice(message: impl Into<String>, options: AnnotationOptions) -> Self {
        Command::new(CommandKind::Notice(options), message)
    }

    pub fn warning(message: impl Into<String>, options: AnnotationOptions) -> Self {
        Command::new(CommandKind::Warning(options), message)
    }

    pub fn error(message: impl Into<String>, options: AnnotationOptions) -> Self {
        Command::new(CommandKind::Error(options), message)
    }

    pub fn group(title: impl Into<String>) -> Self {
        Command::new(CommandKind::Group, title)
    }

    pub fn end_group() -> Self {
        Command::new(CommandKind::EndGroup, String::new())
    }

    /// Mask any value; non-text values are masked in their text form.
    pub fn add_mask<T: Serialize + ?Sized>(value: &T) -> Self {
        Command::new(CommandKind::AddMask, make_string(value))
    }

    pub fn stop_commands(token: impl Into<String>) -> Self {
        Command::new(CommandKind::StopCommands, token)
    }

    pub fn resume_commands(token: impl Into<String>) -> Self {
        Command::new(CommandKind::ResumeCommands(token.into()), String::new())
    }

    /// Encode to a single protocol line, without the trailing newline.
    pub fn encode(&self) -> String {
        build_command_line(
            self.kind.name(),
            &self.message,
            &self.kind.options_string(),
            self.kind.escapes_message(),
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_scenario() {
        let cmd = Command::notice(
            "Missing semicolon",
            AnnotationOptions::new()
                .file("app.js")
                .line(1)
                .col(5)
                .end_column(7),
        );
        assert_eq!(
            cmd.encode(),
            "::notice file=app.js,col=5,endColumn=7,line=1::Missing semicolon"
        );
    }

    #[test]
    fn test_annotation_message_not_escaped() {
        let cmd = Command::error("100%\ndone", AnnotationOptions::new().title("Build: failed"));
        assert_eq!(cmd.encode(), "::error title=Build%3A failed::100%\ndone");
    }

    #[test]
    fn test_all_options() {
        let options = AnnotationOptions::new()
            .title("T")
            .file("f.rs")
            .col(1)
            .end_column(2)
            .line(3)
            .end_line(4);
        assert_eq!(
            Command::warning("w", options).encode(),
            "::warning title=T,file=f.rs,col=1,endColumn=2,line=3,endLine=4::w"
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::debug("Set the variable").encode(), "::debug::Set the variable");
        assert_eq!(Command::group("My title").encode(), "::group::My title");
        assert_eq!(Command::end_group().encode(), "::endgroup::");
        assert_eq!(Command::stop_commands("12345").encode(), "::stop-commands::12345");
        assert_eq!(Command::resume_commands("12345").encode(), "::12345::");
    }

    #[test]
    fn test_add_mask_escapes() {
        assert_eq!(Command::add_mask("p%ss\nword").encode(), "::add-mask::p%25ss%0Aword");
        assert_eq!(Command::add_mask(&1234).encode(), "::add-mask::1234");
    }

    #[test]
    fn test_display_matches_encode() {
        let cmd = Command::debug("x");
        assert_eq!(cmd.to_string(), cmd.encode());
    }

    #[test]
    fn test_options_is_empty() {
        assert!(AnnotationOptions::new().is_empty());
        assert!(!AnnotationOptions::new().line(1).is_empty());
    }
}
