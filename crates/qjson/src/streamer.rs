//! Groups the lexer's tokens into one batch per top-level value.
//!
//! The streamer counts open braces and brackets as tokens go by. Whenever
//! both counts are back at zero the tokens gathered so far form a complete
//! value and are handed to the caller, so a transport can feed whatever bytes
//! it happens to read and still get exactly one batch per value. A scalar at
//! the top level is a batch of its own.

use alloc::vec::Vec;
use core::mem;

use crate::{
    LexError, Lexer, NestingError, NestingErrorKind, StreamError, StreamerOptions, Token,
    TokenKind,
};

#[derive(Debug, Default)]
struct Batcher {
    tokens: Vec<Token>,
    braces: usize,
    brackets: usize,
    size: usize,
    options: StreamerOptions,
}

impl Batcher {
    /// Takes the lexer's next result. Any error drops the partial batch.
    fn consume<F>(
        &mut self,
        token: Result<Token, LexError>,
        handler: &mut F,
    ) -> Result<(), StreamError>
    where
        F: FnMut(Vec<Token>),
    {
        let result = token
            .map_err(StreamError::from)
            .and_then(|token| self.push(token, handler));
        if let Err(_err) = &result {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_err, "discarding partial token batch");
            self.reset();
        }
        result
    }

    fn push<F>(&mut self, token: Token, handler: &mut F) -> Result<(), StreamError>
    where
        F: FnMut(Vec<Token>),
    {
        if token.kind == TokenKind::Skip {
            return Ok(());
        }
        let error = |kind| NestingError {
            kind,
            line: token.line,
            column: token.column,
        };
        if token.kind == TokenKind::Operator {
            match token.text.first() {
                Some(b'{') => self.braces += 1,
                Some(b'[') => self.brackets += 1,
                Some(b'}') => {
                    self.braces = self
                        .braces
                        .checked_sub(1)
                        .ok_or(error(NestingErrorKind::UnmatchedClose(b'}')))?;
                }
                Some(b']') => {
                    self.brackets = self
                        .brackets
                        .checked_sub(1)
                        .ok_or(error(NestingErrorKind::UnmatchedClose(b']')))?;
                }
                _ => {}
            }
        }
        if self.braces + self.brackets > self.options.max_nesting {
            return Err(error(NestingErrorKind::TooDeep {
                limit: self.options.max_nesting,
            })
            .into());
        }
        self.size += token.text.len();
        if self.size > self.options.max_batch_size {
            return Err(error(NestingErrorKind::TooLarge {
                limit: self.options.max_batch_size,
            })
            .into());
        }
        self.tokens.push(token);
        if self.braces == 0 && self.brackets == 0 {
            let batch = self.take();
            #[cfg(feature = "tracing")]
            tracing::trace!(tokens = batch.len(), "emitting token batch");
            handler(batch);
        }
        Ok(())
    }

    fn take(&mut self) -> Vec<Token> {
        self.braces = 0;
        self.brackets = 0;
        self.size = 0;
        mem::take(&mut self.tokens)
    }

    fn reset(&mut self) {
        self.take();
    }
}

/// Lexer plus token batching.
///
/// ```
/// use qjson::Streamer;
///
/// let mut streamer = Streamer::new();
/// let mut batches = Vec::new();
/// streamer.feed(b"{\"a\": [1", &mut |b| batches.push(b)).unwrap();
/// assert!(batches.is_empty());
/// streamer.feed(b"]} true", &mut |b| batches.push(b)).unwrap();
/// streamer.flush(&mut |b| batches.push(b)).unwrap();
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[0].len(), 7);
/// ```
#[derive(Debug, Default)]
pub struct Streamer {
    lexer: Lexer,
    batcher: Batcher,
}

impl Streamer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(StreamerOptions::default())
    }

    #[must_use]
    pub fn with_options(options: StreamerOptions) -> Self {
        Self {
            lexer: Lexer::with_max_token_size(options.max_batch_size),
            batcher: Batcher {
                options,
                ..Batcher::default()
            },
        }
    }

    /// Feeds a chunk of input. `handler` receives every batch completed by
    /// this chunk, in order.
    ///
    /// A lexical or nesting error drops the partial batch, and input up to
    /// the next newline is skipped (see [`Lexer::feed`]). Values after that
    /// newline, in this chunk or a later one, are still delivered; the first
    /// error is returned once the chunk has been consumed.
    pub fn feed<F>(&mut self, bytes: &[u8], handler: &mut F) -> Result<(), StreamError>
    where
        F: FnMut(Vec<Token>),
    {
        let Self { lexer, batcher } = self;
        lexer.feed(bytes, &mut |token| batcher.consume(token, handler))
    }

    /// Ends the input. A last top-level scalar is completed and delivered;
    /// tokens of a value that never closed are handed over as a final,
    /// incomplete batch so the parser can report what is missing.
    pub fn flush<F>(&mut self, handler: &mut F) -> Result<(), StreamError>
    where
        F: FnMut(Vec<Token>),
    {
        let Self { lexer, batcher } = self;
        lexer.flush(&mut |token| batcher.consume(token, handler))?;
        if !batcher.tokens.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!(tokens = batcher.tokens.len(), "flushing incomplete batch");
            handler(batcher.take());
        }
        Ok(())
    }

    /// Drops any partial token and batch.
    pub fn reset(&mut self) {
        self.lexer.reset();
        self.batcher.reset();
    }
}
