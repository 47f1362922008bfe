//! Reference-counted JSON values for machine-protocol plumbing.
//!
//! The crate has four layers:
//!
//! - [`Value`], a tree of null, integer, float, boolean, byte-string,
//!   [`List`] and [`Dict`] nodes. Children are [`SharedValue`] handles, so a
//!   subtree can be shared between trees without copying.
//! - [`Lexer`], a byte-at-a-time tokenizer that can be fed arbitrary chunks.
//! - [`Streamer`], which groups tokens into one batch per top-level value,
//!   and [`ValueStream`], which parses those batches as they complete.
//! - [`Parser`], which builds values from token batches and also fills
//!   printf-style placeholders (`%d %ld %lld %I64d %u %lu %llu %I64u %i %f
//!   %s %p`) from an argument list.
//!
//! Output goes through [`to_json`] and [`to_json_pretty`]. Non-ASCII bytes
//! are always written as `\uXXXX` escapes.
//!
//! ```
//! use std::sync::Arc;
//!
//! use qjson::qjson;
//!
//! let args = qjson::parse("{'node-name': 'drive0'}").unwrap().shared();
//! let cmd = qjson!("{'execute': %s, 'arguments': %p}", "blockdev-del", &args).unwrap();
//!
//! let dict = cmd.as_dict().unwrap();
//! assert_eq!(dict.get_str("execute").unwrap(), "blockdev-del");
//! assert!(Arc::ptr_eq(dict.get_shared("arguments").unwrap(), &args));
//! assert_eq!(args.to_json(), r#"{"node-name": "drive0"}"#);
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod dict;
mod list;
mod lit;
mod value;
mod writer;

mod error;
mod lexer;
mod options;
mod parser;
mod stream;
mod streamer;

#[cfg(any(test, feature = "serde"))]
mod serde_impl;

#[cfg(test)]
mod tests;

pub use dict::{Dict, Iter as DictIter};
pub use error::{
    AccessError, LexError, LexErrorKind, NestingError, NestingErrorKind, ParseError,
    ParseErrorKind, StreamError,
};
pub use lexer::{DEFAULT_MAX_TOKEN_SIZE, Lexer, Token, TokenKind};
pub use list::List;
pub use lit::Lit;
pub use options::{ParserOptions, StreamerOptions};
pub use parser::{Arg, Parser, parse, parse_bytes, parse_tokens, parse_with_args};
pub use stream::ValueStream;
pub use streamer::Streamer;
pub use value::{Kind, SharedValue, Value};
pub use writer::{to_json, to_json_pretty, write_json};

/// Builds a value from a template and a list of arguments, converting each
/// argument with [`Arg::from`].
///
/// Rust integers of type `i32` fill `%d`, `%ld` and `%i`; `i64` fills
/// `%ld`, `%lld` and `%I64d`. Unsigned `u32` fills every `%u` form and
/// `u64` fills `%lu`, `%llu` and `%I64u`.
///
/// ```rust
/// use qjson::qjson;
///
/// let v = qjson!("[%d, %ld, %i, %f, %s]", 1, 2_i64, true, 0.5, "x").unwrap();
/// assert_eq!(v.to_json(), r#"[1, 2, true, 0.5, "x"]"#);
/// ```
#[macro_export]
macro_rules! qjson {
    ( $fmt:expr $(, $arg:expr )* $(,)? ) => {
        $crate::parse_with_args($fmt, &[$($crate::Arg::from($arg)),*])
    };
}
