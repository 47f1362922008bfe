//! Byte-at-a-time JSON tokenizer.
//!
//! The lexer is a finite-state machine fed with arbitrary chunks of bytes.
//! Its state survives between [`Lexer::feed`] calls, so splitting the input at
//! any byte boundary yields the same token sequence as feeding it in one
//! piece. Completed tokens are handed to a caller-supplied closure as soon as
//! their last byte (or the byte right after them, for numbers, keywords and
//! whitespace) has been seen.
//!
//! Besides standard JSON the lexer accepts single-quoted strings and the
//! interpolation placeholders `%d %ld %lld %I64d %u %lu %llu %I64u %s %i %f
//! %p %%`, which come out as [`TokenKind::Escape`] tokens. String tokens keep
//! their quotes and escape sequences verbatim; decoding is the parser's job.
//!
//! After an error the lexer skips to the next newline before it produces
//! tokens again, so one malformed line does not swallow the lines after it.
//!
//! Positions are 1-based; columns count bytes.

use alloc::vec::Vec;
use core::mem;

use bstr::BString;

use crate::{LexError, LexErrorKind};

/// Default upper bound on the length of a single token.
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 64 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// One of `{ } [ ] : ,`.
    Operator,
    Integer,
    Float,
    /// A run of lowercase ASCII letters; not necessarily a valid keyword.
    Keyword,
    /// A quoted string, quotes and escapes included.
    String,
    /// An interpolation placeholder such as `%d`.
    Escape,
    /// Insignificant whitespace.
    Skip,
}

/// A lexeme together with its kind and the position of its first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: BString,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<BString>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Whether this is the single-byte operator `op`.
    #[must_use]
    pub fn is_operator(&self, op: u8) -> bool {
        self.kind == TokenKind::Operator && self.text.as_slice() == [op]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Whitespace,
    String { quote: u8 },
    StringEscape { quote: u8 },
    StringUnicode { quote: u8, digits: u8 },
    Minus,
    Zero,
    Digits,
    Point,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentDigits,
    Keyword,
    Percent,
    PercentL,
    PercentLL,
    PercentI,
    PercentI6,
    PercentI64,
}

/// What the state machine does with one input byte.
enum Step {
    /// Append the byte to the current token and move to the given state.
    Consume(State),
    /// Append the byte and emit the completed token.
    Finish(TokenKind),
    /// Emit the current token without the byte, then re-read the byte from
    /// [`State::Start`].
    Emit(TokenKind),
    Fail(LexErrorKind),
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

impl State {
    fn step(self, b: u8) -> Step {
        use Step::{Consume, Emit, Fail, Finish};
        match self {
            State::Start => match b {
                b'{' | b'}' | b'[' | b']' | b':' | b',' => Finish(TokenKind::Operator),
                b if is_whitespace(b) => Consume(State::Whitespace),
                b'"' | b'\'' => Consume(State::String { quote: b }),
                b'-' => Consume(State::Minus),
                b'0' => Consume(State::Zero),
                b'1'..=b'9' => Consume(State::Digits),
                b'a'..=b'z' => Consume(State::Keyword),
                b'%' => Consume(State::Percent),
                _ => Fail(LexErrorKind::InvalidCharacter(b)),
            },
            State::Whitespace => {
                if is_whitespace(b) {
                    Consume(self)
                } else {
                    Emit(TokenKind::Skip)
                }
            }
            State::String { quote } => match b {
                0 => Fail(LexErrorKind::InvalidCharacter(b)),
                b'\\' => Consume(State::StringEscape { quote }),
                b if b == quote => Finish(TokenKind::String),
                _ => Consume(self),
            },
            State::StringEscape { quote } => match b {
                b'"' | b'\'' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                    Consume(State::String { quote })
                }
                b'u' => Consume(State::StringUnicode { quote, digits: 0 }),
                _ => Fail(LexErrorKind::InvalidEscapeState(b)),
            },
            State::StringUnicode { quote, digits } => {
                if !b.is_ascii_hexdigit() {
                    Fail(LexErrorKind::InvalidUnicodeEscape(b))
                } else if digits == 3 {
                    Consume(State::String { quote })
                } else {
                    Consume(State::StringUnicode {
                        quote,
                        digits: digits + 1,
                    })
                }
            }
            State::Minus => match b {
                b'0' => Consume(State::Zero),
                b'1'..=b'9' => Consume(State::Digits),
                _ => Fail(LexErrorKind::InvalidCharacter(b)),
            },
            State::Zero => match b {
                b'.' => Consume(State::Point),
                b'e' | b'E' => Consume(State::Exponent),
                _ => Emit(TokenKind::Integer),
            },
            State::Digits => match b {
                b'0'..=b'9' => Consume(self),
                b'.' => Consume(State::Point),
                b'e' | b'E' => Consume(State::Exponent),
                _ => Emit(TokenKind::Integer),
            },
            State::Point => match b {
                b'0'..=b'9' => Consume(State::Fraction),
                _ => Fail(LexErrorKind::InvalidCharacter(b)),
            },
            State::Fraction => match b {
                b'0'..=b'9' => Consume(self),
                b'e' | b'E' => Consume(State::Exponent),
                _ => Emit(TokenKind::Float),
            },
            State::Exponent => match b {
                b'+' | b'-' => Consume(State::ExponentSign),
                b'0'..=b'9' => Consume(State::ExponentDigits),
                _ => Fail(LexErrorKind::InvalidCharacter(b)),
            },
            State::ExponentSign => match b {
                b'0'..=b'9' => Consume(State::ExponentDigits),
                _ => Fail(LexErrorKind::InvalidCharacter(b)),
            },
            State::ExponentDigits => match b {
                b'0'..=b'9' => Consume(self),
                _ => Emit(TokenKind::Float),
            },
            State::Keyword => match b {
                b'a'..=b'z' => Consume(self),
                _ => Emit(TokenKind::Keyword),
            },
            State::Percent => match b {
                b'd' | b'u' | b's' | b'i' | b'f' | b'p' | b'%' => Finish(TokenKind::Escape),
                b'l' => Consume(State::PercentL),
                b'I' => Consume(State::PercentI),
                _ => Fail(LexErrorKind::InvalidInterpolation(b)),
            },
            State::PercentL => match b {
                b'd' | b'u' => Finish(TokenKind::Escape),
                b'l' => Consume(State::PercentLL),
                _ => Fail(LexErrorKind::InvalidInterpolation(b)),
            },
            State::PercentLL | State::PercentI64 => match b {
                b'd' | b'u' => Finish(TokenKind::Escape),
                _ => Fail(LexErrorKind::InvalidInterpolation(b)),
            },
            State::PercentI => match b {
                b'6' => Consume(State::PercentI6),
                _ => Fail(LexErrorKind::InvalidInterpolation(b)),
            },
            State::PercentI6 => match b {
                b'4' => Consume(State::PercentI64),
                _ => Fail(LexErrorKind::InvalidInterpolation(b)),
            },
        }
    }

    /// How the state ends when the input does.
    fn at_end(self) -> Result<Option<TokenKind>, LexErrorKind> {
        match self {
            State::Start => Ok(None),
            State::Whitespace => Ok(Some(TokenKind::Skip)),
            State::Zero | State::Digits => Ok(Some(TokenKind::Integer)),
            State::Fraction | State::ExponentDigits => Ok(Some(TokenKind::Float)),
            State::Keyword => Ok(Some(TokenKind::Keyword)),
            State::String { .. } => Err(LexErrorKind::UnterminatedString),
            State::StringEscape { .. } | State::StringUnicode { .. } => {
                Err(LexErrorKind::UnterminatedEscapeSequence)
            }
            State::Minus
            | State::Point
            | State::Exponent
            | State::ExponentSign
            | State::Percent
            | State::PercentL
            | State::PercentLL
            | State::PercentI
            | State::PercentI6
            | State::PercentI64 => Err(LexErrorKind::UnterminatedToken),
        }
    }
}

/// The streaming tokenizer.
///
/// ```
/// use qjson::{Lexer, LexError, TokenKind};
///
/// let mut lexer = Lexer::new();
/// let mut kinds = Vec::new();
/// let mut sink = |t: Result<qjson::Token, LexError>| -> Result<(), LexError> {
///     kinds.push(t?.kind);
///     Ok(())
/// };
/// lexer.feed(b"[1", &mut sink).unwrap();
/// lexer.feed(b"2]", &mut sink).unwrap();
/// lexer.flush(&mut sink).unwrap();
/// assert_eq!(kinds, [TokenKind::Operator, TokenKind::Integer, TokenKind::Operator]);
/// ```
#[derive(Debug, Clone)]
pub struct Lexer {
    state: State,
    token: Vec<u8>,
    token_line: usize,
    token_column: usize,
    line: usize,
    column: usize,
    max_token_size: usize,
    recovering: bool,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_token_size(DEFAULT_MAX_TOKEN_SIZE)
    }

    /// A lexer that rejects any token longer than `max_token_size` bytes with
    /// [`LexErrorKind::TokenTooLarge`].
    #[must_use]
    pub fn with_max_token_size(max_token_size: usize) -> Self {
        Self {
            state: State::Start,
            token: Vec::new(),
            token_line: 1,
            token_column: 1,
            line: 1,
            column: 1,
            max_token_size,
            recovering: false,
        }
    }

    /// Line and column of the next byte to be fed.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Drops any partial token and ends error recovery. The position
    /// counters keep running.
    pub fn reset(&mut self) {
        self.state = State::Start;
        self.token.clear();
        self.recovering = false;
    }

    /// Tokenizes `bytes`, calling `emit` with every completed token.
    ///
    /// A lexical error is passed to `emit` as `Err`. After it, or after
    /// `emit` itself fails, the partial token is dropped and input is
    /// skipped up to and including the next newline, where lexing resumes.
    /// Recovery carries over into the next call, so the tokens emitted do
    /// not depend on how the input was split into chunks. The first error
    /// returned by `emit` is returned once the whole chunk has been
    /// consumed.
    pub fn feed<E, F>(&mut self, bytes: &[u8], emit: &mut F) -> Result<(), E>
    where
        F: FnMut(Result<Token, LexError>) -> Result<(), E>,
    {
        let mut first = None;
        for &b in bytes {
            if self.recovering {
                self.recovering = b != b'\n';
            } else if let Err(err) = self.push_byte(b, emit) {
                self.recover(b);
                first.get_or_insert(err);
            }
            self.advance(b);
        }
        first.map_or(Ok(()), Err)
    }

    /// Signals the end of input, emitting a token still pending (a trailing
    /// number, keyword or whitespace run). Input that stops inside a string,
    /// an escape sequence or an incomplete number or placeholder is reported
    /// to `emit` as an error.
    pub fn flush<E, F>(&mut self, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(Result<Token, LexError>) -> Result<(), E>,
    {
        let state = mem::replace(&mut self.state, State::Start);
        self.recovering = false;
        match state.at_end() {
            Ok(Some(kind)) => emit(Ok(self.take(kind))),
            Ok(None) => Ok(()),
            Err(kind) => {
                let err = LexError {
                    kind,
                    line: self.token_line,
                    column: self.token_column,
                };
                self.reset();
                emit(Err(err))
            }
        }
    }

    fn push_byte<E, F>(&mut self, b: u8, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(Result<Token, LexError>) -> Result<(), E>,
    {
        loop {
            match self.state.step(b) {
                Step::Consume(next) => {
                    if let Err(err) = self.append(b) {
                        self.recover(b);
                        return emit(Err(err));
                    }
                    self.state = next;
                    return Ok(());
                }
                Step::Finish(kind) => {
                    if let Err(err) = self.append(b) {
                        self.recover(b);
                        return emit(Err(err));
                    }
                    self.state = State::Start;
                    return emit(Ok(self.take(kind)));
                }
                Step::Emit(kind) => {
                    self.state = State::Start;
                    emit(Ok(self.take(kind)))?;
                }
                Step::Fail(kind) => {
                    let err = self.error(kind);
                    self.recover(b);
                    return emit(Err(err));
                }
            }
        }
    }

    /// Drops the partial token and skips input through the next newline,
    /// `b` included.
    fn recover(&mut self, b: u8) {
        self.state = State::Start;
        self.token.clear();
        self.recovering = b != b'\n';
    }

    fn append(&mut self, b: u8) -> Result<(), LexError> {
        if self.token.is_empty() {
            self.token_line = self.line;
            self.token_column = self.column;
        }
        if self.token.len() >= self.max_token_size {
            return Err(LexError {
                kind: LexErrorKind::TokenTooLarge {
                    limit: self.max_token_size,
                },
                line: self.token_line,
                column: self.token_column,
            });
        }
        self.token.push(b);
        Ok(())
    }

    fn take(&mut self, kind: TokenKind) -> Token {
        Token {
            kind,
            text: BString::from(mem::take(&mut self.token)),
            line: self.token_line,
            column: self.token_column,
        }
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self, b: u8) {
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}
