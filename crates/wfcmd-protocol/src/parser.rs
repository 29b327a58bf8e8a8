//! File block parser
//!
//! Recovers key/value blocks from an append file. Blocks may span several
//! value lines; a block ends at the line equal to its delimiter. A header
//! carrying the same delimiter inside an open block starts a new block, so a
//! writer that died before its terminator does not swallow the next block.

use bytes::BytesMut;
use indexmap::IndexMap;
use tracing::debug;

use crate::encode::HEADER_MARKER;
use crate::escape::{unescape_data, unescape_property};

/// A decoded key/value block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub key: String,
    pub value: String,
}

/// Block currently being collected
#[derive(Debug)]
struct Pending {
    key: String,
    delimiter: String,
    lines: Vec<String>,
}

impl Pending {
    fn open(key: &str, delimiter: &str) -> Self {
        Self {
            key: unescape_property(key.trim()),
            delimiter: delimiter.to_string(),
            lines: Vec::new(),
        }
    }

    /// Block for an unterminated header: kept with at least one value line.
    fn into_truncated(self) -> Option<Block> {
        if self.lines.is_empty() {
            debug!(key = %self.key, "Dropping header without value");
            None
        } else {
            debug!(key = %self.key, "Block ended without delimiter, keeping value");
            Some(self.into_block())
        }
    }

    fn into_block(self) -> Block {
        Block {
            key: self.key,
            value: unescape_data(&self.lines.join("\n")),
        }
    }
}

/// Incremental block parser
pub struct BlockParser {
    buffer: BytesMut,
    // Bytes at the front of `buffer` already known to hold no newline
    scanned: usize,
    pending: Option<Pending>,
}

impl BlockParser {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: 0,
            pending: None,
        }
    }

    /// Add data to the parser buffer
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to parse a complete block from the buffered lines
    pub fn parse(&mut self) -> Option<Block> {
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let raw = self.buffer.split_to(self.scanned + offset + 1);
            self.scanned = 0;
            let line = decode_line(&raw);
            if let Some(block) = self.process_line(line) {
                return Some(block);
            }
        }
        self.scanned = self.buffer.len();
        None
    }

    /// Flush an unterminated last line at end of input.
    ///
    /// A block cut short after at least one value line is kept; a header with
    /// nothing after it is dropped.
    pub fn finish(&mut self) -> Option<Block> {
        if !self.buffer.is_empty() {
            let raw = self.buffer.split();
            self.scanned = 0;
            let line = decode_line(&raw);
            if let Some(block) = self.process_line(line) {
                return Some(block);
            }
        }

        self.pending.take().and_then(Pending::into_truncated)
    }

    fn process_line(&mut self, line: String) -> Option<Block> {
        let header = split_header(&line);

        match self.pending.take() {
            Some(pending) if line == pending.delimiter => Some(pending.into_block()),
            Some(pending) => match header {
                Some((key, delimiter)) if delimiter == pending.delimiter => {
                    self.pending = Some(Pending::open(key, delimiter));
                    pending.into_truncated()
                }
                _ => {
                    let mut pending = pending;
                    pending.lines.push(line);
                    self.pending = Some(pending);
                    None
                }
            },
            None => {
                // Anything outside a block that is not a header is ignored
                if let Some((key, delimiter)) = header {
                    self.pending = Some(Pending::open(key, delimiter));
                }
                None
            }
        }
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `key<<DELIMITER` with a non-empty delimiter.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let (key, delimiter) = line.split_once(HEADER_MARKER)?;
    let delimiter = delimiter.trim();
    (!delimiter.is_empty()).then_some((key, delimiter))
}

/// Strip the line terminator and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Parse a whole file into a key/value mapping.
///
/// Repeated keys keep their first position and their last value.
pub fn parse_blocks(data: &[u8]) -> IndexMap<String, String> {
    let mut parser = BlockParser::new();
    parser.feed(data);

    let mut map = IndexMap::new();
    while let Some(block) = parser.parse() {
        map.insert(block.key, block.value);
    }
    if let Some(block) = parser.finish() {
        map.insert(block.key, block.value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::build_file_block;

    #[test]
    fn test_parse_single_block() {
        let map = parse_blocks(b"name<<__ENV_DELIMITER__\nvalue\n__ENV_DELIMITER__\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["name"], "value");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let mut data = Vec::new();
        for (k, v) in [("a", "1"), ("b", "2"), ("a", "3"), ("c", "4"), ("b", "5")] {
            data.extend_from_slice(&build_file_block(k, v).unwrap());
        }

        let map = parse_blocks(&data);
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], "3");
        assert_eq!(map["b"], "5");
        assert_eq!(map["c"], "4");
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_dangling_header_dropped() {
        let map = parse_blocks(b"a<<__ENV_DELIMITER__\n1\n__ENV_DELIMITER__\nb<<__ENV_DELIMITER__\n");
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn test_dangling_header_without_newline() {
        let map = parse_blocks(b"b<<__ENV_DELIMITER__");
        assert!(map.is_empty());
    }

    #[test]
    fn test_missing_terminator_keeps_value() {
        let map = parse_blocks(b"a<<__ENV_DELIMITER__\n1");
        assert_eq!(map["a"], "1");
    }

    #[test]
    fn test_unterminated_block_followed_by_block() {
        let map = parse_blocks(
            b"A<<__ENV_DELIMITER__\n1\nB<<__ENV_DELIMITER__\n2\n__ENV_DELIMITER__\n",
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map["A"], "1");
        assert_eq!(map["B"], "2");
    }

    #[test]
    fn test_dangling_header_followed_by_block() {
        let map = parse_blocks(b"A<<D\nB<<D\n2\nD\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["B"], "2");
    }

    #[test]
    fn test_header_with_other_delimiter_is_value() {
        let map = parse_blocks(b"notes<<EOF\ncmd<<HEREDOC\nEOF\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["notes"], "cmd<<HEREDOC");
    }

    #[test]
    fn test_long_line_fed_byte_by_byte() {
        let value = "x".repeat(10_000);
        let data = build_file_block("big", &value).unwrap();

        let mut parser = BlockParser::new();
        let mut blocks = Vec::new();
        for byte in data.iter() {
            parser.feed(std::slice::from_ref(byte));
            blocks.extend(parser.parse());
        }

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].key, "big");
        assert_eq!(blocks[0].value, value);
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_multi_line_value() {
        let map = parse_blocks(b"notes<<EOF\nfirst\r\nsecond\nEOF\n");
        assert_eq!(map["notes"], "first\nsecond");
    }

    #[test]
    fn test_round_trip_escaped_content() {
        let value = "50% of:\r\nthings, here";
        let data = build_file_block("weird:key", value).unwrap();

        let map = parse_blocks(&data);
        assert_eq!(map["weird:key"], value);
    }

    #[test]
    fn test_ignores_plain_lines() {
        let map = parse_blocks(b"junk line\nk<<D\nv\nD\ntrailing\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], "v");
    }

    #[test]
    fn test_incremental_feed() {
        let mut parser = BlockParser::new();
        parser.feed(b"key<<__ENV_DELI");
        assert!(parser.parse().is_none());

        parser.feed(b"MITER__\nval");
        assert!(parser.parse().is_none());

        parser.feed(b"ue\n__ENV_DELIMITER__\n");
        assert_eq!(
            parser.parse(),
            Some(Block {
                key: "key".into(),
                value: "value".into()
            })
        );
        assert!(parser.finish().is_none());
    }
}
