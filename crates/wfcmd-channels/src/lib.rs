//! wfcmd Channels
//!
//! File-based half of the workflow command protocol:
//! - Append-only channel files named by environment variables
//! - Reading key/value blocks back out of those files
//! - The triggering event payload, parsed once per process

pub mod error;
pub mod event;
pub mod files;
pub mod reader;

pub use error::{ChannelError, ChannelResult};
pub use event::{event_payload, load_event_payload, EventPayload};
pub use files::{Channel, ChannelFiles};
pub use reader::{read_blocks, workflow_environment, WorkflowEnv};
