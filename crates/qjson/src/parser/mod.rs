//! Parser over token batches.
//!
//! The parser works on a finished token list, one top-level value at a time,
//! as produced by [`Streamer`]. It dispatches on the next significant token
//! and keeps open containers on an explicit stack, so nesting up to
//! [`ParserOptions::max_depth`] does not grow the call stack.
//!
//! ```text
//! value    := object | array | escape | keyword | literal
//! object   := '{' [ pair (',' pair)* ] '}'
//! pair     := value(string) ':' value
//! array    := '[' [ value (',' value)* ] ']'
//! escape   := '%d' | '%ld' | '%lld' | '%I64d' | '%u' | '%lu' | '%llu' | '%I64u'
//!           | '%s' | '%i' | '%f' | '%p'
//! keyword  := 'true' | 'false'
//! literal  := STRING | INTEGER | FLOAT
//! ```

mod args;
mod string;

use alloc::{sync::Arc, vec::Vec};
use core::{mem, num::IntErrorKind};

use bstr::{BString, ByteSlice};

pub use self::args::Arg;
use crate::{
    Dict, List, ParseError, ParseErrorKind, ParserOptions, SharedValue, Streamer, Token,
    TokenKind, Value,
};

/// Parser state for one token batch.
///
/// ```
/// use qjson::{Arg, Parser, Streamer, Value};
///
/// let mut batches = Vec::new();
/// let mut streamer = Streamer::new();
/// streamer.feed(b"[%d, 'x']", &mut |b| batches.push(b)).unwrap();
///
/// let value = Parser::with_args(&batches[0], &[Arg::Int(7)]).parse().unwrap();
/// assert_eq!(value.to_json(), r#"[7, "x"]"#);
/// ```
#[derive(Debug)]
pub struct Parser<'t, 'a> {
    tokens: &'t [Token],
    pos: usize,
    args: Option<&'a [Arg<'a>]>,
    next_arg: usize,
    depth: usize,
    options: ParserOptions,
}

impl<'t> Parser<'t, 'static> {
    /// A parser for plain JSON; any placeholder fails with
    /// [`ParseErrorKind::MissingArgument`].
    #[must_use]
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::build(tokens, None)
    }
}

impl<'t, 'a> Parser<'t, 'a> {
    /// A parser that substitutes `args`, in order, for the placeholders in
    /// `tokens`.
    #[must_use]
    pub fn with_args(tokens: &'t [Token], args: &'a [Arg<'a>]) -> Self {
        Self::build(tokens, Some(args))
    }

    fn build(tokens: &'t [Token], args: Option<&'a [Arg<'a>]>) -> Self {
        Self {
            tokens,
            pos: 0,
            args,
            next_arg: 0,
            depth: 0,
            options: ParserOptions::default(),
        }
    }

    #[must_use]
    pub fn options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses exactly one value.
    ///
    /// Fails with [`ParseErrorKind::EmptyInput`] when the batch holds no
    /// significant token, [`ParseErrorKind::MultipleValues`] when tokens are
    /// left over, and [`ParseErrorKind::UnusedArguments`] when not every
    /// argument was consumed.
    pub fn parse(mut self) -> Result<SharedValue, ParseError> {
        let Some(first) = self.peek() else {
            return Err(ParseError::empty());
        };
        let (line, column) = (first.line, first.column);
        let value = self.value()?;
        if let Some(extra) = self.peek() {
            return Err(Self::error_at(extra, ParseErrorKind::MultipleValues));
        }
        if let Some(args) = self.args {
            let unused = args.len() - self.next_arg;
            if unused > 0 {
                return Err(ParseError::new(
                    ParseErrorKind::UnusedArguments(unused),
                    line,
                    column,
                ));
            }
        }
        Ok(value)
    }

    fn error_at(token: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, token.line, token.column)
    }

    fn end_of_input(&self) -> ParseError {
        let (line, column) = self
            .tokens
            .last()
            .map_or((1, 1), |t| (t.line, t.column + t.text.len()));
        ParseError::new(ParseErrorKind::UnexpectedEndOfInput, line, column)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => Self::error_at(
                token,
                ParseErrorKind::UnexpectedToken {
                    expected,
                    found: token.text.clone(),
                },
            ),
            None => self.end_of_input(),
        }
    }

    fn missing_value(&self) -> ParseError {
        self.unexpected("a value")
    }

    /// The next significant token, without consuming it.
    fn peek(&self) -> Option<&'t Token> {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.kind != TokenKind::Skip)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            if token.kind != TokenKind::Skip {
                return Some(token);
            }
        }
        None
    }

    fn peek_operator(&self, op: u8) -> bool {
        self.peek().is_some_and(|t| t.is_operator(op))
    }

    fn expect_operator(&mut self, op: u8, expected: &'static str) -> Result<(), ParseError> {
        if self.peek_operator(op) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Fails with [`ParseErrorKind::TrailingComma`] if `close` directly follows
    /// the `,` just consumed.
    fn no_trailing_comma(&self, close: u8) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token.is_operator(close) => {
                Err(Self::error_at(token, ParseErrorKind::TrailingComma))
            }
            _ => Ok(()),
        }
    }

    fn enter(&mut self, open: &Token) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(Self::error_at(
                open,
                ParseErrorKind::NestingTooDeep {
                    limit: self.options.max_depth,
                },
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Consumes `,` (returning `true`) or `close` (returning `false`).
    fn separator(&mut self, close: u8, expected: &'static str) -> Result<bool, ParseError> {
        match self.peek() {
            Some(t) if t.is_operator(b',') => {
                self.bump();
                Ok(true)
            }
            Some(t) if t.is_operator(close) => {
                self.bump();
                Ok(false)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Parses one value. Open containers live in `stack`, so nesting depth
    /// costs heap, not call stack.
    fn value(&mut self) -> Result<SharedValue, ParseError> {
        let mut stack: Vec<Frame> = Vec::new();
        'value: loop {
            let mut done = match self.peek() {
                Some(open) if open.is_operator(b'[') => {
                    self.bump();
                    self.enter(open)?;
                    if self.peek_operator(b']') {
                        self.bump();
                        self.depth -= 1;
                        Value::new_list().shared()
                    } else {
                        stack.push(Frame::List(List::new()));
                        continue 'value;
                    }
                }
                Some(open) if open.is_operator(b'{') => {
                    self.bump();
                    self.enter(open)?;
                    if self.peek_operator(b'}') {
                        self.bump();
                        self.depth -= 1;
                        Value::new_dict().shared()
                    } else {
                        let key = self.key()?;
                        stack.push(Frame::Dict(Dict::new(), key));
                        continue 'value;
                    }
                }
                _ => self.scalar()?,
            };

            // fold the finished value into its parents, closing them as
            // far as the input allows
            loop {
                let Some(mut frame) = stack.pop() else {
                    return Ok(done);
                };
                let more = match &mut frame {
                    Frame::List(list) => {
                        list.append(done);
                        self.separator(b']', "',' or ']'")?
                    }
                    Frame::Dict(dict, key) => {
                        // duplicate keys: the last one wins
                        dict.put(mem::take(key), done);
                        self.separator(b'}', "',' or '}'")?
                    }
                };
                if more {
                    match &mut frame {
                        Frame::List(_) => self.no_trailing_comma(b']')?,
                        Frame::Dict(_, key) => {
                            self.no_trailing_comma(b'}')?;
                            *key = self.key()?;
                        }
                    }
                    stack.push(frame);
                    continue 'value;
                }
                self.depth -= 1;
                done = frame.into_value();
            }
        }
    }

    /// Parses a dict key and the `:` after it.
    fn key(&mut self) -> Result<BString, ParseError> {
        let token = self.peek().ok_or_else(|| self.end_of_input())?;
        if token.is_operator(b'{') || token.is_operator(b'[') {
            return Err(Self::error_at(token, ParseErrorKind::KeyNotString));
        }
        let key = self.scalar()?;
        let Value::String(key) = &*key else {
            return Err(Self::error_at(token, ParseErrorKind::KeyNotString));
        };
        let key = key.clone();
        self.expect_operator(b':', "':'")?;
        Ok(key)
    }

    /// Parses a placeholder, keyword or literal.
    fn scalar(&mut self) -> Result<SharedValue, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.end_of_input());
        };
        let value = match token.kind {
            TokenKind::Escape => self.escape(token)?,
            TokenKind::Keyword => match token.text.as_bytes() {
                b"true" => Value::Bool(true).shared(),
                b"false" => Value::Bool(false).shared(),
                _ => {
                    return Err(Self::error_at(
                        token,
                        ParseErrorKind::UnknownKeyword(token.text.clone()),
                    ));
                }
            },
            TokenKind::String => string::decode(&token.text, self.args.is_some())
                .map(|s| Value::String(s).shared())
                .map_err(|kind| Self::error_at(token, kind))?,
            TokenKind::Integer => parse_integer(&token.text)
                .map(|i| Value::Int(i).shared())
                .map_err(|kind| Self::error_at(token, kind))?,
            TokenKind::Float => parse_float(&token.text)
                .map(|f| Value::Float(f).shared())
                .map_err(|kind| Self::error_at(token, kind))?,
            TokenKind::Operator | TokenKind::Skip => return Err(self.missing_value()),
        };
        self.bump();
        Ok(value)
    }

    fn escape(&mut self, token: &Token) -> Result<SharedValue, ParseError> {
        let escape: &'static str = match token.text.as_bytes() {
            b"%d" => "%d",
            b"%ld" => "%ld",
            b"%lld" => "%lld",
            b"%I64d" => "%I64d",
            b"%u" => "%u",
            b"%lu" => "%lu",
            b"%llu" => "%llu",
            b"%I64u" => "%I64u",
            b"%i" => "%i",
            b"%f" => "%f",
            b"%s" => "%s",
            b"%p" => "%p",
            _ => {
                return Err(Self::error_at(
                    token,
                    ParseErrorKind::InvalidInterpolation(token.text.clone()),
                ));
            }
        };
        let arg = self
            .args
            .and_then(|args| args.get(self.next_arg))
            .ok_or_else(|| Self::error_at(token, ParseErrorKind::MissingArgument))?;
        self.next_arg += 1;
        arg.interpolate(escape.as_bytes()).ok_or_else(|| {
            Self::error_at(
                token,
                ParseErrorKind::ArgumentMismatch {
                    escape,
                    found: arg.type_name(),
                },
            )
        })
    }
}

/// A container still waiting for its closing bracket.
enum Frame {
    List(List),
    /// The dict so far and the key of the value being parsed.
    Dict(Dict, BString),
}

impl Frame {
    fn into_value(self) -> SharedValue {
        match self {
            Frame::List(list) => Value::List(list),
            Frame::Dict(dict, _) => Value::Dict(dict),
        }
        .shared()
    }
}

fn parse_integer(text: &[u8]) -> Result<i64, ParseErrorKind> {
    let text = text.to_str().map_err(|_| ParseErrorKind::InvalidNumber)?;
    text.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParseErrorKind::IntegerOverflow,
        _ => ParseErrorKind::InvalidNumber,
    })
}

fn parse_float(text: &[u8]) -> Result<f64, ParseErrorKind> {
    // no inf/nan spellings, no hex floats
    if text.is_empty()
        || !text
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return Err(ParseErrorKind::InvalidNumber);
    }
    let f: f64 = text
        .to_str()
        .ok()
        .and_then(|t| t.parse().ok())
        .ok_or(ParseErrorKind::InvalidNumber)?;
    if f.is_finite() {
        Ok(f)
    } else {
        Err(ParseErrorKind::FloatOverflow)
    }
}

/// Lexes `bytes` and parses the single value they contain.
fn parse_one(bytes: &[u8], args: Option<&[Arg<'_>]>) -> Result<SharedValue, ParseError> {
    let mut streamer = Streamer::new();
    let mut batches: Vec<Vec<Token>> = Vec::new();
    let mut collect = |batch: Vec<Token>| batches.push(batch);
    streamer.feed(bytes, &mut collect)?;
    streamer.flush(&mut collect)?;

    let mut batches = batches.into_iter();
    let first = batches.next().ok_or_else(ParseError::empty)?;
    let value = Parser::build(&first, args).parse()?;
    if let Some(token) = batches.next().as_ref().and_then(|batch| batch.first()) {
        return Err(Parser::error_at(token, ParseErrorKind::MultipleValues));
    }
    Ok(value)
}

/// Parses a JSON text holding exactly one value.
///
/// Single-quoted strings are accepted. Interpolation placeholders are not,
/// see [`parse_with_args`].
///
/// ```
/// let v = qjson::parse("{'foo': [1, 2.5, true]}").unwrap();
/// assert_eq!(v.to_json(), r#"{"foo": [1, 2.5, true]}"#);
/// ```
pub fn parse(text: &str) -> Result<Value, ParseError> {
    parse_bytes(text.as_bytes())
}

/// Like [`parse`], for input that may not be UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value, ParseError> {
    parse_one(bytes, None).map(Arc::unwrap_or_clone)
}

/// Parses a template, substituting `args` for its placeholders in order.
///
/// The result is a shared handle so a top-level `%p` hands back the very
/// value that was passed in. See [`Arg`] for the accepted argument types and
/// the [`qjson!`](crate::qjson!) macro for a shorthand.
///
/// ```
/// use qjson::{Arg, parse_with_args};
///
/// let v = parse_with_args("[%d, {'name': %s}]", &[Arg::Int(3), Arg::Str("vda")]).unwrap();
/// assert_eq!(v.to_json(), r#"[3, {"name": "vda"}]"#);
/// ```
pub fn parse_with_args(text: &str, args: &[Arg<'_>]) -> Result<SharedValue, ParseError> {
    parse_one(text.as_bytes(), Some(args))
}

/// Parses one value from an already lexed token list. Whitespace tokens are
/// ignored.
pub fn parse_tokens(tokens: &[Token]) -> Result<Value, ParseError> {
    Parser::new(tokens).parse().map(Arc::unwrap_or_clone)
}

#[cfg(test)]
mod tests;
