//! Command line and file block encoding

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::trace;

use crate::command::COMMAND_MARKER;
use crate::error::{ProtocolError, ProtocolResult};
use crate::escape::{escape_data, escape_property, to_camel_case};

/// Sentinel that opens and closes every value in a file block.
pub const ENV_DELIMITER: &str = "__ENV_DELIMITER__";

/// Separates the key from the delimiter on a block header line.
pub const HEADER_MARKER: &str = "<<";

/// Join options as `name=value` pairs, skipping absent values.
///
/// Names are camelCased and values property-escaped. Pairs keep the order
/// they are given in.
pub fn build_options_string<'a, V, I>(options: I) -> String
where
    V: Serialize,
    I: IntoIterator<Item = (&'a str, Option<V>)>,
{
    options
        .into_iter()
        .filter_map(|(name, value)| {
            value.map(|v| format!("{}={}", to_camel_case(name), escape_property(&v)))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Build `::name options::message`.
///
/// The space before the options is only written when there are options.
pub fn build_command_line(
    name: &str,
    message: &str,
    options_string: &str,
    escape_message: bool,
) -> String {
    let message = if escape_message {
        escape_data(message)
    } else {
        message.to_string()
    };

    let mut line = String::with_capacity(
        name.len() + options_string.len() + message.len() + 2 * COMMAND_MARKER.len() + 1,
    );
    line.push_str(COMMAND_MARKER);
    line.push_str(name);
    if !options_string.is_empty() {
        line.push(' ');
        line.push_str(options_string);
    }
    line.push_str(COMMAND_MARKER);
    line.push_str(&message);
    line
}

/// Encode one key/value block for an append file.
pub fn build_file_block<K, V>(key: &K, value: &V) -> ProtocolResult<Bytes>
where
    K: Serialize + ?Sized,
    V: Serialize + ?Sized,
{
    let key = escape_property(key);
    if key.is_empty() {
        return Err(ProtocolError::InvalidKey("key cannot be empty".into()));
    }
    if key.contains(HEADER_MARKER) {
        return Err(ProtocolError::InvalidKey(format!(
            "key cannot contain {:?}: {}",
            HEADER_MARKER, key
        )));
    }

    // Escaped values never span lines, so only an exact match can end the block early
    let value = escape_data(value);
    if value == ENV_DELIMITER {
        return Err(ProtocolError::DelimiterCollision { key });
    }

    let mut buf = BytesMut::with_capacity(
        key.len() + value.len() + HEADER_MARKER.len() + 2 * ENV_DELIMITER.len() + 3,
    );
    buf.put_slice(key.as_bytes());
    buf.put_slice(HEADER_MARKER.as_bytes());
    buf.put_slice(ENV_DELIMITER.as_bytes());
    buf.put_u8(b'\n');
    buf.put_slice(value.as_bytes());
    buf.put_u8(b'\n');
    buf.put_slice(ENV_DELIMITER.as_bytes());
    buf.put_u8(b'\n');

    trace!(key = %key, len = buf.len(), "Encoded file block");
    Ok(buf.freeze())
}
