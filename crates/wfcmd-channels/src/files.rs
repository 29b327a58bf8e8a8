//! Append-only channel files

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use wfcmd_core::EnvStore;
use wfcmd_protocol::{build_file_block, clean_markdown};

use crate::error::{ChannelError, ChannelResult};
use crate::reader::{read_blocks, WorkflowEnv};

/// Files the orchestrator hands to each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Step outputs visible to later steps and jobs
    Output,
    /// Private state round-tripped to post steps
    State,
    /// Environment variables for later steps
    Env,
    /// Directories prepended to the executable search path
    Path,
    /// Markdown rendered on the job summary page
    StepSummary,
    /// Webhook payload of the triggering event
    EventPayload,
}

impl Channel {
    /// Variable holding the channel's file path.
    pub fn variable(&self) -> &'static str {
        match self {
            Channel::Output => "GITHUB_OUTPUT",
            Channel::State => "GITHUB_STATE",
            Channel::Env => "GITHUB_ENV",
            Channel::Path => "GITHUB_PATH",
            Channel::StepSummary => "GITHUB_STEP_SUMMARY",
            Channel::EventPayload => "GITHUB_EVENT_PATH",
        }
    }
}

/// Access to the channel files named in an environment store
#[derive(Debug, Clone)]
pub struct ChannelFiles<E> {
    env: E,
}

impl<E: EnvStore> ChannelFiles<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Path of a channel file; fails when its variable is unset.
    pub fn path(&self, channel: Channel) -> ChannelResult<PathBuf> {
        Ok(PathBuf::from(self.env.require(channel.variable())?))
    }

    /// Append one key/value block to the file named by `variable`.
    ///
    /// The block is fully encoded before the file is opened, and the handle
    /// is closed on every return path.
    pub fn emit_to_file<K, V>(&self, variable: &str, key: &K, value: &V) -> ChannelResult<()>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let path = PathBuf::from(self.env.require(variable)?);
        let block = build_file_block(key, value)?;

        let mut file = open_append(&path)?;
        file.write_all(&block)
            .map_err(|e| ChannelError::io(&path, e))?;

        debug!(variable, path = %path.display(), bytes = block.len(), "Appended block");
        Ok(())
    }

    /// Set a step output.
    pub fn set_output<V: Serialize + ?Sized>(&self, name: &str, value: &V) -> ChannelResult<()> {
        self.emit_to_file(Channel::Output.variable(), name, value)
    }

    /// Save state for this action's post step, read back as `STATE_{name}`.
    pub fn save_state<V: Serialize + ?Sized>(&self, name: &str, value: &V) -> ChannelResult<()> {
        self.emit_to_file(Channel::State.variable(), name, value)
    }

    /// Export an environment variable to later steps.
    pub fn set_env<V: Serialize + ?Sized>(&self, name: &str, value: &V) -> ChannelResult<()> {
        self.emit_to_file(Channel::Env.variable(), name, value)
    }

    /// Prepend a directory to the search path of later steps.
    pub fn add_system_path(&self, dir: impl AsRef<Path>) -> ChannelResult<()> {
        let path = self.path(Channel::Path)?;
        let mut line = dir.as_ref().to_string_lossy().into_owned();
        line.push('\n');

        let mut file = open_append(&path)?;
        file.write_all(line.as_bytes())
            .map_err(|e| ChannelError::io(&path, e))?;

        debug!(dir = %dir.as_ref().display(), "Added system path");
        Ok(())
    }

    /// Append markdown to the job summary.
    pub fn append_job_summary(&self, markdown: &str) -> ChannelResult<()> {
        let path = self.path(Channel::StepSummary)?;
        let mut file = open_append(&path)?;
        write_summary(&mut file, markdown).map_err(|e| ChannelError::io(&path, e))
    }

    /// Replace the job summary with `markdown`.
    pub fn overwrite_job_summary(&self, markdown: &str) -> ChannelResult<()> {
        let path = self.path(Channel::StepSummary)?;
        let mut file = File::create(&path).map_err(|e| ChannelError::io(&path, e))?;
        write_summary(&mut file, markdown).map_err(|e| ChannelError::io(&path, e))
    }

    /// Delete the job summary file.
    ///
    /// An unset variable or an already missing file is not an error.
    pub fn remove_job_summary(&self) -> ChannelResult<()> {
        let Some(path) = self.env.get(Channel::StepSummary.variable()) else {
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path, "Removed job summary");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChannelError::io(path, e)),
        }
    }

    /// Variables exported by earlier steps through the env file.
    pub fn workflow_environment(&self) -> ChannelResult<IndexMap<String, String>> {
        crate::reader::workflow_environment(&self.env)
    }

    /// State saved by earlier steps, read directly from the state file.
    pub fn saved_state(&self) -> ChannelResult<IndexMap<String, String>> {
        read_blocks(&self.path(Channel::State)?)
    }

    /// Process environment layered over the workflow env file.
    pub fn workflow_env(&self) -> ChannelResult<WorkflowEnv<&E>> {
        Ok(WorkflowEnv::new(&self.env, self.workflow_environment()?))
    }

    /// Look a variable up in the process environment, then in the env file.
    pub fn get_env(&self, name: &str) -> ChannelResult<Option<String>> {
        Ok(self.workflow_env()?.get(name))
    }
}

fn open_append(path: &Path) -> ChannelResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ChannelError::io(path, e))
}

fn write_summary(file: &mut File, markdown: &str) -> io::Result<()> {
    let mut text = clean_markdown(markdown);
    text.push('\n');
    file.write_all(text.as_bytes())
}
