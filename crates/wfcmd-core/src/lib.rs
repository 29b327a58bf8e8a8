//! wfcmd Core - Environment and Configuration
//!
//! This crate provides the pieces every other wfcmd crate reads from:
//! - A key/value environment store abstraction (process or in-memory)
//! - Process-wide command configuration
//! - The catalog of well-known CI variables

pub mod config;
pub mod env;
pub mod error;
pub mod variables;

pub use config::CommandsConfig;
pub use env::{EnvStore, MapEnv, ProcessEnv};
pub use error::{Error, Result};
pub use variables::{GithubVariables, RunnerVariables, Variables};
