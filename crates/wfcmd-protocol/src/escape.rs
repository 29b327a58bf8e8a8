//! Escaping alphabets
//!
//! Message text escapes `%`, `\r` and `\n`. Property values additionally
//! escape `:` and `,`, which delimit options on a command line.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::scalar::scalar_text;

const DATA_ESCAPES: &[(&str, char)] = &[("25", '%'), ("0D", '\r'), ("0A", '\n')];
const PROPERTY_ESCAPES: &[(&str, char)] = &[
    ("25", '%'),
    ("0D", '\r'),
    ("0A", '\n'),
    ("3A", ':'),
    ("2C", ','),
];

/// Coerce any serializable value to protocol text.
///
/// Strings are taken as is, sequences and maps become compact JSON, numbers
/// and booleans use their display form and `null` is empty. Non-finite floats
/// read `nan`, `inf` and `-inf`.
pub fn make_string<T: Serialize + ?Sized>(data: &T) -> String {
    if let Some(text) = scalar_text(data) {
        return text;
    }

    match serde_json::to_value(data) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) => String::new(),
        Ok(other) => other.to_string(),
        Err(e) => {
            warn!(error = %e, "Value cannot be represented as text, using empty string");
            String::new()
        }
    }
}

/// Escape text for the message part of a command line.
pub fn escape_data<T: Serialize + ?Sized>(data: &T) -> String {
    // `%` must go first so the escapes introduced below are not re-escaped
    make_string(data)
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape text for an option value or a file block key.
pub fn escape_property<T: Serialize + ?Sized>(data: &T) -> String {
    escape_data(data).replace(':', "%3A").replace(',', "%2C")
}

/// Turn escaped text back into human-readable markdown.
pub fn clean_markdown(markdown: &str) -> String {
    markdown
        .replace("%25", "%")
        .replace("%0D", "\r")
        .replace("%0A", "\n")
}

/// Exact inverse of [`escape_data`].
pub fn unescape_data(escaped: &str) -> String {
    decode(escaped, DATA_ESCAPES)
}

/// Exact inverse of [`escape_property`].
pub fn unescape_property(escaped: &str) -> String {
    decode(escaped, PROPERTY_ESCAPES)
}

/// Single left-to-right pass, so `%250A` decodes to `%0A` and not a newline.
fn decode(escaped: &str, table: &[(&str, char)]) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match table.iter().find(|(code, _)| after.starts_with(code)) {
            Some((code, ch)) => {
                out.push(*ch);
                rest = &after[code.len()..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// `end_column` -> `endColumn`
pub fn to_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, word) in text.split('_').filter(|w| !w.is_empty()).enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(&chars.as_str().to_lowercase());
        }
    }

    out
}
