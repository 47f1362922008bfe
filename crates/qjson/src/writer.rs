//! JSON text output.
//!
//! The output is always ASCII: multi-byte UTF-8 in strings is re-encoded as
//! `\uXXXX` escapes (a surrogate pair for code points past the BMP), and bytes
//! that do not start a valid sequence become `\uFFFD`. A `/` is never escaped.
//!
//! Floats use the fixed-point `%f` format with trailing zeros and a bare
//! decimal point stripped, so `32.43` prints as `32.43` and `10.0` as `10`.
//! Scientific notation is never produced and does not round-trip textually.
//! The parser never yields a non-finite float, but one built directly or
//! passed through `%f` has no JSON spelling and prints as `inf`, `-inf` or
//! `NaN`, which no JSON reader accepts.
//!
//! [`Value::Null`] renders as nothing; callers filter it out beforehand.

use alloc::{format, string::String};
use core::fmt::{self, Write};

use crate::Value;

const INDENT: &str = "    ";

/// Writes `value` as JSON into `out`. With `pretty` set, every dict or list
/// element starts on its own line, indented four spaces per level.
pub fn write_json<W: Write + ?Sized>(value: &Value, pretty: bool, out: &mut W) -> fmt::Result {
    write_value(value, pretty, 0, out)
}

/// Renders `value` as compact JSON: `{"a": 1, "b": [1, 2]}`.
#[must_use]
pub fn to_json(value: &Value) -> String {
    render(value, false)
}

/// Renders `value` as indented JSON.
#[must_use]
pub fn to_json_pretty(value: &Value) -> String {
    render(value, true)
}

fn render(value: &Value, pretty: bool) -> String {
    let mut out = String::new();
    // fmt::Write for String is infallible
    let _ = write_json(value, pretty, &mut out);
    out
}

fn write_value<W: Write + ?Sized>(
    value: &Value,
    pretty: bool,
    depth: usize,
    out: &mut W,
) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::Int(i) => write!(out, "{i}"),
        Value::Float(f) => write_float(*f, out),
        Value::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Value::String(s) => write_string(s, out),
        Value::List(list) => {
            if list.is_empty() {
                return out.write_str("[]");
            }
            out.write_char('[')?;
            for (i, item) in list.iter().enumerate() {
                separator(i == 0, pretty, depth + 1, out)?;
                write_value(item, pretty, depth + 1, out)?;
            }
            close(']', pretty, depth, out)
        }
        Value::Dict(dict) => {
            if dict.is_empty() {
                return out.write_str("{}");
            }
            out.write_char('{')?;
            for (i, (key, item)) in dict.iter().enumerate() {
                separator(i == 0, pretty, depth + 1, out)?;
                write_string(key, out)?;
                out.write_str(": ")?;
                write_value(item, pretty, depth + 1, out)?;
            }
            close('}', pretty, depth, out)
        }
    }
}

fn separator<W: Write + ?Sized>(first: bool, pretty: bool, depth: usize, out: &mut W) -> fmt::Result {
    if pretty {
        if !first {
            out.write_char(',')?;
        }
        newline(depth, out)
    } else if first {
        Ok(())
    } else {
        out.write_str(", ")
    }
}

fn close<W: Write + ?Sized>(bracket: char, pretty: bool, depth: usize, out: &mut W) -> fmt::Result {
    if pretty {
        newline(depth, out)?;
    }
    out.write_char(bracket)
}

fn newline<W: Write + ?Sized>(depth: usize, out: &mut W) -> fmt::Result {
    out.write_char('\n')?;
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

fn write_float<W: Write + ?Sized>(f: f64, out: &mut W) -> fmt::Result {
    let text = format!("{f:.6}");
    if text.contains('.') {
        out.write_str(text.trim_end_matches('0').trim_end_matches('.'))
    } else {
        out.write_str(&text)
    }
}

/// Decodes one UTF-8 sequence of two to four bytes. Overlong forms are
/// accepted; a bad lead byte, a truncated sequence or a code point past
/// U+10FFFF yields `None`.
fn decode_sequence(bytes: &[u8]) -> Option<(u32, usize)> {
    let lead = *bytes.first()?;
    let len = match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return None,
    };
    let tail = bytes.get(1..len)?;
    if tail.iter().any(|b| b & 0xC0 != 0x80) {
        return None;
    }
    let mut code = u32::from(lead) & (0x7F >> len);
    for b in tail {
        code = (code << 6) | u32::from(b & 0x3F);
    }
    (code <= 0x10_FFFF).then_some((code, len))
}

fn write_string<W: Write + ?Sized>(bytes: &[u8], out: &mut W) -> fmt::Result {
    out.write_char('"')?;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' => out.write_str("\\\"")?,
            b'\\' => out.write_str("\\\\")?,
            0x08 => out.write_str("\\b")?,
            0x0C => out.write_str("\\f")?,
            b'\n' => out.write_str("\\n")?,
            b'\r' => out.write_str("\\r")?,
            b'\t' => out.write_str("\\t")?,
            0x00..=0x1F => write!(out, "\\u{b:04X}")?,
            0x20..=0x7F => out.write_char(char::from(b))?,
            _ => match decode_sequence(&bytes[i..]) {
                Some((code, len)) if code >= 0x1_0000 => {
                    let code = code - 0x1_0000;
                    write!(
                        out,
                        "\\u{:04X}\\u{:04X}",
                        0xD800 + (code >> 10),
                        0xDC00 + (code & 0x3FF)
                    )?;
                    i += len;
                    continue;
                }
                Some((code, len)) => {
                    write!(out, "\\u{code:04X}")?;
                    i += len;
                    continue;
                }
                None => out.write_str("\\uFFFD")?,
            },
        }
        i += 1;
    }
    out.write_char('"')
}
