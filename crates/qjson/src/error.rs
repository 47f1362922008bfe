//! Error types for lexing, token batching, parsing and typed access.
//!
//! Every error that can be caused by external input is a plain value carrying
//! the 1-based position of the offending token, so a transport can turn it
//! into a one-line diagnostic without the process ever aborting.

use bstr::BString;
use thiserror::Error;

use crate::value::Kind;

fn byte_char(b: &u8) -> char {
    char::from(*b)
}

/// A failure inside the lexer's state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character 0x{0:02X}")]
    InvalidCharacter(u8),
    #[error("invalid escape character 0x{0:02X}")]
    InvalidEscapeState(u8),
    #[error("invalid interpolation '%{}'", byte_char(.0))]
    InvalidInterpolation(u8),
    #[error("invalid hex digit 0x{0:02X} in unicode escape")]
    InvalidUnicodeEscape(u8),
    #[error("unterminated token")]
    UnterminatedToken,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated escape sequence")]
    UnterminatedEscapeSequence,
    #[error("token longer than {limit} bytes")]
    TokenTooLarge { limit: usize },
}

/// A structural failure detected while batching tokens into top-level values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct NestingError {
    pub kind: NestingErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingErrorKind {
    #[error("unmatched '{}'", byte_char(.0))]
    UnmatchedClose(u8),
    #[error("nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("value larger than {limit} bytes")]
    TooLarge { limit: usize },
}

/// Error raised by the streaming front ends, which see both lexical and
/// structural failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),
    #[error("nesting error: {0}")]
    Nesting(#[from] NestingError),
}

/// A failure to turn text (or a token batch) into a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// Error for input that produced no tokens at all.
    pub(crate) fn empty() -> Self {
        Self::new(ParseErrorKind::EmptyInput, 1, 1)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expecting a value, input is empty")]
    EmptyInput,
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken { expected: &'static str, found: BString },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("trailing comma")]
    TrailingComma,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated escape sequence")]
    UnterminatedEscapeSequence,
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("invalid escape '\\{}'", byte_char(.0))]
    InvalidEscape(u8),
    #[error("unknown keyword '{0}'")]
    UnknownKeyword(BString),
    #[error("key is not a string in object")]
    KeyNotString,
    #[error("invalid number")]
    InvalidNumber,
    #[error("integer literal out of range")]
    IntegerOverflow,
    #[error("float literal out of range")]
    FloatOverflow,
    #[error("no argument left for interpolation")]
    MissingArgument,
    #[error("argument {found} does not match '{escape}'")]
    ArgumentMismatch { escape: &'static str, found: &'static str },
    #[error("{0} interpolation argument(s) left unused")]
    UnusedArguments(usize),
    #[error("invalid interpolation '{0}'")]
    InvalidInterpolation(BString),
    #[error("can't interpolate into string")]
    InterpolationInString,
    #[error("expecting at most one JSON value")]
    MultipleValues,
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("{0}")]
    Lex(LexErrorKind),
    #[error("{0}")]
    Nesting(NestingErrorKind),
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let kind = match err.kind {
            LexErrorKind::UnterminatedString => ParseErrorKind::UnterminatedString,
            LexErrorKind::UnterminatedEscapeSequence => ParseErrorKind::UnterminatedEscapeSequence,
            LexErrorKind::InvalidUnicodeEscape(_) => ParseErrorKind::InvalidUnicodeEscape,
            LexErrorKind::InvalidEscapeState(b) => ParseErrorKind::InvalidEscape(b),
            LexErrorKind::InvalidInterpolation(b) => {
                ParseErrorKind::InvalidInterpolation(BString::from(alloc::vec![b'%', b]))
            }
            other => ParseErrorKind::Lex(other),
        };
        ParseError::new(kind, err.line, err.column)
    }
}

impl From<NestingError> for ParseError {
    fn from(err: NestingError) -> Self {
        ParseError::new(ParseErrorKind::Nesting(err.kind), err.line, err.column)
    }
}

impl From<StreamError> for ParseError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Lex(e) => e.into(),
            StreamError::Nesting(e) => e.into(),
        }
    }
}

/// Failure of a typed accessor on a [`Dict`](crate::Dict) or a checked
/// conversion out of a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("key '{0}' not found")]
    KeyNotFound(BString),
    #[error("expected {expected}, found {found}")]
    WrongType { expected: Kind, found: Kind },
}
