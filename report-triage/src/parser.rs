//! Recovery of the JSON object embedded in a completion response.
//!
//! The model is asked for single-line JSON, but the service hands its output
//! back with control characters escaped (`\n`, `\t`, `\xNN`, ...). The parser
//! performs exactly one unescape pass and then a strict JSON parse. There is
//! no further repair: truncated output, stray braces or quotes that the
//! unescape pass exposes all fail deterministically.

use serde_json::{Map, Value};

use crate::errors::MalformedResponseError;

/// Parses a raw completion response into a JSON object.
///
/// # Errors
/// - [`MalformedResponseError::Escape`] / [`MalformedResponseError::Utf8`]
///   when the unescape step fails
/// - [`MalformedResponseError::Json`] when the text is not valid JSON
/// - [`MalformedResponseError::NotAnObject`] for valid JSON of another type
pub fn parse_response(raw: &str) -> Result<Map<String, Value>, MalformedResponseError> {
    let text = unescape_control_sequences(raw)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(MalformedResponseError::NotAnObject("array")),
        Value::String(_) => Err(MalformedResponseError::NotAnObject("string")),
        Value::Number(_) => Err(MalformedResponseError::NotAnObject("number")),
        Value::Bool(_) => Err(MalformedResponseError::NotAnObject("bool")),
        Value::Null => Err(MalformedResponseError::NotAnObject("null")),
    }
}

/// Decodes backslash escapes byte-wise, then validates the result as UTF-8.
///
/// Recognised: `\\ \' \" \a \b \f \n \r \t \v`, `\xHH`, octal `\o`..`\ooo`
/// and backslash-newline (dropped). Any other escape is kept verbatim,
/// backslash included.
pub fn unescape_control_sequences(text: &str) -> Result<String, MalformedResponseError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let offset = i;
        let Some(&next) = bytes.get(i + 1) else {
            return Err(MalformedResponseError::Escape {
                offset,
                detail: "trailing backslash",
            });
        };
        i += 2;

        match next {
            b'\n' => {}
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'x' => {
                let hex = bytes
                    .get(i..i + 2)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or(MalformedResponseError::Escape {
                        offset,
                        detail: "invalid \\x escape",
                    })?;
                out.push(hex);
                i += 2;
            }
            b'0'..=b'7' => {
                let mut value = u32::from(next - b'0');
                let mut digits = 1;
                while digits < 3 {
                    match bytes.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xff) as u8);
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }

    Ok(String::from_utf8(out)?)
}

/// Inverse of [`unescape_control_sequences`]: backslashes and control
/// characters are escaped, everything else is left as is.
pub fn escape_control_sequences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
