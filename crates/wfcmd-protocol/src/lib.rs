//! Workflow Command Protocol
//!
//! A line-oriented text protocol spoken to the CI orchestrator.
//!
//! ## Command Format
//! ```text
//! ::<command> <name>=<value>,<name>=<value>::<message>
//! ::<command>::<message>
//! ::endgroup::
//! ::<token>::
//! ```
//!
//! ## File Block Format
//! ```text
//! <key><<__ENV_DELIMITER__
//! <value>
//! __ENV_DELIMITER__
//! ```

pub mod command;
pub mod encode;
pub mod error;
pub mod escape;
pub mod parser;
mod scalar;

pub use command::{AnnotationOptions, Command, CommandKind, COMMAND_MARKER};
pub use encode::{
    build_command_line, build_file_block, build_options_string, ENV_DELIMITER, HEADER_MARKER,
};
pub use error::{ProtocolError, ProtocolResult};
pub use escape::{
    clean_markdown, escape_data, escape_property, make_string, to_camel_case, unescape_data,
    unescape_property,
};
pub use parser::{parse_blocks, Block, BlockParser};
