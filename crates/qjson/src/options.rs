/// Limits enforced while batching tokens into top-level values.
///
/// # Examples
///
/// ```rust
/// use qjson::{Streamer, StreamerOptions};
///
/// let streamer = Streamer::with_options(StreamerOptions {
///     max_nesting: 32,
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamerOptions {
    /// Deepest combined brace and bracket nesting a value may reach.
    ///
    /// Opening one more level fails with
    /// [`NestingErrorKind::TooDeep`](crate::NestingErrorKind::TooDeep).
    ///
    /// # Default
    ///
    /// `1024`
    pub max_nesting: usize,

    /// Largest number of token bytes a single top-level value may span,
    /// whitespace excluded. Also bounds the length of a single token.
    ///
    /// # Default
    ///
    /// 64 MiB
    pub max_batch_size: usize,
}

impl Default for StreamerOptions {
    fn default() -> Self {
        Self {
            max_nesting: 1024,
            max_batch_size: 64 << 20,
        }
    }
}

/// Configuration for [`Parser`](crate::Parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest container nesting the parser descends into before failing
    /// with [`ParseErrorKind::NestingTooDeep`](crate::ParseErrorKind::NestingTooDeep).
    ///
    /// Token batches produced by a [`Streamer`](crate::Streamer) are already
    /// bounded by [`StreamerOptions::max_nesting`]; this guards token lists
    /// built by hand.
    ///
    /// # Default
    ///
    /// `1024`
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 1024 }
    }
}
