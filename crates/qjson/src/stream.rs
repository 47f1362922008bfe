//! Push-style parsing of a byte stream into top-level values.

use alloc::sync::Arc;

use crate::{
    ParseError, Parser, ParserOptions, StreamError, Streamer, StreamerOptions, Token, Value,
};

/// A [`Streamer`] whose batches are parsed as they complete.
///
/// The handler is called once per top-level value with either the value or
/// the error that parsing its batch produced, so a transport can answer a
/// malformed message and carry on. Lexical and nesting errors are returned
/// from [`feed`](Self::feed) and [`flush`](Self::flush) instead.
///
/// ```
/// use qjson::{Value, ValueStream};
///
/// let mut seen = Vec::new();
/// let mut stream = ValueStream::new(|v: Result<Value, _>| seen.push(v));
/// stream.feed(b"{'execute': 'qmp_capabilities'}[1,").unwrap();
/// stream.feed(b"] 7").unwrap();
/// stream.flush().unwrap();
/// drop(stream);
///
/// assert_eq!(seen.len(), 3);
/// assert!(seen[0].is_ok());
/// assert!(seen[1].is_err()); // trailing comma
/// assert_eq!(seen[2], Ok(Value::Int(7)));
/// ```
pub struct ValueStream<F>
where
    F: FnMut(Result<Value, ParseError>),
{
    streamer: Streamer,
    options: ParserOptions,
    handler: F,
}

impl<F> ValueStream<F>
where
    F: FnMut(Result<Value, ParseError>),
{
    pub fn new(handler: F) -> Self {
        Self::with_options(StreamerOptions::default(), handler)
    }

    pub fn with_options(options: StreamerOptions, handler: F) -> Self {
        Self {
            streamer: Streamer::with_options(options),
            options: ParserOptions {
                max_depth: options.max_nesting,
            },
            handler,
        }
    }

    /// Feeds a chunk of input; see [`Streamer::feed`] for the error
    /// behaviour.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let Self {
            streamer,
            options,
            handler,
        } = self;
        streamer.feed(bytes, &mut |batch| deliver(&batch, *options, &mut *handler))
    }

    /// Ends the input. A value left incomplete is reported to the handler
    /// as a parse error.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        let Self {
            streamer,
            options,
            handler,
        } = self;
        streamer.flush(&mut |batch| deliver(&batch, *options, &mut *handler))
    }

    /// Drops any partial input.
    pub fn reset(&mut self) {
        self.streamer.reset();
    }

    pub fn into_handler(self) -> F {
        self.handler
    }
}

fn deliver<F>(batch: &[Token], options: ParserOptions, handler: &mut F)
where
    F: FnMut(Result<Value, ParseError>),
{
    let result = Parser::new(batch)
        .options(options)
        .parse()
        .map(Arc::unwrap_or_clone);
    #[cfg(feature = "tracing")]
    if let Err(err) = &result {
        tracing::debug!(error = %err, "rejecting malformed value");
    }
    handler(result);
}

impl<F> core::fmt::Debug for ValueStream<F>
where
    F: FnMut(Result<Value, ParseError>),
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValueStream")
            .field("streamer", &self.streamer)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
