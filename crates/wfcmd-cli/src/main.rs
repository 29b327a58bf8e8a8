//! wfcmd CLI
//!
//! Emit workflow commands and write channel files from shell steps.
//!
//! # Usage
//!
//! ```bash
//! # Annotate a file
//! wfcmd notice "Missing semicolon" --file app.js --line 1 --col 5 --end-column 7
//!
//! # Run a command inside a collapsible group
//! wfcmd group "Build" -- cargo build --release
//!
//! # Pass data to later steps
//! wfcmd set-output version 1.2.3
//! wfcmd set-env RUST_BACKTRACE 1
//! ```

use std::path::PathBuf;
use std::process::{Command as Process, ExitCode};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use wfcmd_channels::{event_payload, ChannelFiles};
use wfcmd_core::{CommandsConfig, EnvStore, ProcessEnv, Variables};
use wfcmd_emitter::{generate_token, Emitter};
use wfcmd_protocol::{AnnotationOptions, Command};

/// wfcmd - workflow command helper
#[derive(Parser, Debug)]
#[command(name = "wfcmd")]
#[command(author, version, about = "Emit workflow commands for the CI orchestrator")]
struct Args {
    /// Write command lines through a child `echo` process
    #[arg(long, global = true)]
    subprocess: bool,

    /// Log level for diagnostics on stderr (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "WFCMD_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a plain line
    Echo { message: String },

    /// Print a debug message
    Debug { message: String },

    /// Create a notice annotation
    Notice(Annotation),

    /// Create a warning annotation
    Warning(Annotation),

    /// Create an error annotation
    Error(Annotation),

    /// Mask a value in the log
    AddMask { value: String },

    /// Open a log group, optionally running a command inside it
    Group {
        title: String,
        /// Command to run; the group is closed when it exits
        #[arg(last = true)]
        run: Vec<String>,
    },

    /// Close the current log group
    Endgroup,

    /// Stop command processing, optionally only while a command runs
    StopCommands {
        /// Token to resume with (generated when omitted)
        #[arg(long)]
        token: Option<String>,
        #[arg(last = true)]
        run: Vec<String>,
    },

    /// Resume command processing stopped with `token`
    ResumeCommands { token: String },

    /// Set a step output
    SetOutput { name: String, value: String },

    /// Save state for the post step
    SaveState { name: String, value: String },

    /// Export an environment variable to later steps
    SetEnv { name: String, value: String },

    /// Prepend a directory to the search path of later steps
    AddPath { dir: PathBuf },

    /// Edit the job summary
    #[command(subcommand)]
    Summary(SummaryCmd),

    /// Print a variable, falling back to the workflow env file
    GetEnv { name: String },

    /// Print state saved by the main step
    GetState { name: String },

    /// Print an action input
    GetInput { name: String },

    /// Print the triggering event payload as JSON
    Event {
        /// JSON pointer into the payload, e.g. /pull_request/number
        #[arg(long)]
        pointer: Option<String>,
    },

    /// Print the well-known variables as JSON
    Vars,
}

#[derive(ClapArgs, Debug)]
struct Annotation {
    message: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    file: Option<String>,
    #[arg(long)]
    col: Option<u32>,
    #[arg(long)]
    end_column: Option<u32>,
    #[arg(long)]
    line: Option<u32>,
    #[arg(long)]
    end_line: Option<u32>,
}

impl Annotation {
    fn options(&self) -> AnnotationOptions {
        AnnotationOptions {
            title: self.title.clone(),
            file: self.file.clone(),
            col: self.col,
            end_column: self.end_column,
            line: self.line,
            end_line: self.end_line,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SummaryCmd {
    /// Append markdown
    Append { markdown: String },
    /// Replace the summary with markdown
    Overwrite { markdown: String },
    /// Delete the summary
    Remove,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let env = ProcessEnv;
    let config = CommandsConfig::from_env(&env);
    debug!(?config, subprocess_flag = args.subprocess, "Loaded configuration");

    let mut emitter = Emitter::new(config);
    let files = ChannelFiles::new(env);
    let use_subprocess = args.subprocess.then_some(true);

    run(args.command, &mut emitter, &files, use_subprocess)
}

fn run(
    command: Cmd,
    emitter: &mut Emitter,
    files: &ChannelFiles<ProcessEnv>,
    use_subprocess: Option<bool>,
) -> Result<ExitCode> {
    match command {
        Cmd::Echo { message } => emitter.echo(message.as_str(), use_subprocess)?,
        Cmd::Debug { message } => emitter.emit(&Command::debug(message), use_subprocess)?,
        Cmd::Notice(a) => emitter.emit(&Command::notice(&a.message, a.options()), use_subprocess)?,
        Cmd::Warning(a) => {
            emitter.emit(&Command::warning(&a.message, a.options()), use_subprocess)?
        }
        Cmd::Error(a) => emitter.emit(&Command::error(&a.message, a.options()), use_subprocess)?,
        Cmd::AddMask { value } => {
            emitter.emit(&Command::add_mask(value.as_str()), use_subprocess)?
        }
        Cmd::Group { title, run } if run.is_empty() => {
            emitter.emit(&Command::group(title), use_subprocess)?
        }
        Cmd::Group { title, run } => {
            return emitter.group(&title, use_subprocess, |_| run_child(&run))?;
        }
        Cmd::Endgroup => emitter.emit(&Command::end_group(), use_subprocess)?,
        Cmd::StopCommands { token, run } if run.is_empty() => {
            // Processing stays stopped; the caller resumes with the printed token
            let token = token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(generate_token);
            emitter.emit(&Command::stop_commands(token.as_str()), use_subprocess)?;
            eprintln!("{}", token);
        }
        Cmd::StopCommands { token, run } => {
            return emitter
                .stop_commands(token.as_deref(), use_subprocess, |_, _| run_child(&run))?;
        }
        Cmd::ResumeCommands { token } => {
            emitter.emit(&Command::resume_commands(token), use_subprocess)?
        }
        Cmd::SetOutput { name, value } => files.set_output(&name, value.as_str())?,
        Cmd::SaveState { name, value } => files.save_state(&name, value.as_str())?,
        Cmd::SetEnv { name, value } => files.set_env(&name, value.as_str())?,
        Cmd::AddPath { dir } => files.add_system_path(&dir)?,
        Cmd::Summary(SummaryCmd::Append { markdown }) => files.append_job_summary(&markdown)?,
        Cmd::Summary(SummaryCmd::Overwrite { markdown }) => {
            files.overwrite_job_summary(&markdown)?
        }
        Cmd::Summary(SummaryCmd::Remove) => files.remove_job_summary()?,
        Cmd::GetEnv { name } => return Ok(print_value(files.get_env(&name)?)),
        Cmd::GetState { name } => return Ok(print_value(files.env().state(&name))),
        Cmd::GetInput { name } => return Ok(print_value(files.env().input(&name))),
        Cmd::Event { pointer } => {
            let payload = event_payload()?;
            let selected = match pointer.as_deref() {
                Some(p) => payload
                    .pointer(p)
                    .with_context(|| format!("No value at {} in event payload", p))?,
                None => payload,
            };
            println!("{}", serde_json::to_string_pretty(selected)?);
        }
        Cmd::Vars => {
            let vars = Variables::from_env(&files.workflow_env()?);
            println!("{}", serde_json::to_string_pretty(&vars)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run a wrapped command and mirror its exit status.
fn run_child(argv: &[String]) -> Result<ExitCode> {
    let (program, rest) = argv.split_first().context("No command given")?;
    info!(program = %program, args = ?rest, "Running wrapped command");

    let status = Process::new(program)
        .args(rest)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    debug!(%status, "Wrapped command finished");
    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

fn print_value(value: Option<String>) -> ExitCode {
    match value {
        Some(v) => {
            println!("{}", v);
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

/// Diagnostics go to stderr; stdout carries the protocol.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_notice() {
        let args = Args::try_parse_from([
            "wfcmd",
            "notice",
            "Missing semicolon",
            "--file",
            "app.js",
            "--line",
            "1",
            "--col",
            "5",
            "--end-column",
            "7",
        ])
        .unwrap();

        let Cmd::Notice(annotation) = args.command else {
            panic!("expected notice");
        };
        let cmd = Command::notice(&annotation.message, annotation.options());
        assert_eq!(
            cmd.encode(),
            "::notice file=app.js,col=5,endColumn=7,line=1::Missing semicolon"
        );
    }

    #[test]
    fn test_parse_group_with_command() {
        let args =
            Args::try_parse_from(["wfcmd", "group", "Build", "--", "cargo", "build"]).unwrap();

        match args.command {
            Cmd::Group { title, run } => {
                assert_eq!(title, "Build");
                assert_eq!(run, vec!["cargo", "build"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_wrapped_group_honours_subprocess_flag() {
        use wfcmd_emitter::MemorySink;

        let direct = MemorySink::new();
        let subprocess = MemorySink::new();
        let mut emitter =
            Emitter::with_sinks(CommandsConfig::default(), direct.clone(), subprocess.clone());
        let files = ChannelFiles::new(ProcessEnv);

        let group = Cmd::Group {
            title: "Tests".into(),
            run: vec!["true".into()],
        };
        run(group, &mut emitter, &files, Some(true)).unwrap();

        let stop = Cmd::StopCommands {
            token: Some("tok".into()),
            run: vec!["true".into()],
        };
        run(stop, &mut emitter, &files, Some(true)).unwrap();

        assert!(direct.lines().is_empty());
        assert_eq!(
            subprocess.lines(),
            vec!["::group::Tests", "::endgroup::", "::stop-commands::tok", "::tok::"]
        );
    }

    #[test]
    fn test_global_subprocess_flag() {
        let args = Args::try_parse_from(["wfcmd", "debug", "x", "--subprocess"]).unwrap();
        assert!(args.subprocess);
    }
}
