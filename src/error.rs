//! Error types raised out-of-band from [`Provider`](crate::provider::Provider)
//! operations.
//!
//! Operator rejection is *not* an error: a matcher or resolver declining its
//! input surfaces as the ordinary [`fail`](crate::state::Outcome::Fail)
//! variant of [`Outcome`](crate::state::Outcome). Only a reader genuinely
//! running out of bytes, or the reader's own I/O failure, is raised here.

use thiserror::Error;

/// Raised when a [`Provider`](crate::provider::Provider) cannot satisfy a
/// `reserve` request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError<E> {
    /// The provider is a direct slice and the request ran past its end, or
    /// the provider is a stream whose reader declined to buffer enough bytes
    /// because its source is exhausted.
    #[error("end of stream")]
    EndOfStream,
    /// The underlying [`Reader`](crate::provider::Reader) raised its own
    /// error while trying to buffer more bytes.
    #[error("reader error: {0}")]
    Reader(#[source] E),
}

impl<E> ProviderError<E> {
    /// Maps the reader's error type, leaving `EndOfStream` untouched.
    pub fn map_reader<F, E2>(self, f: F) -> ProviderError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::EndOfStream => ProviderError::EndOfStream,
            Self::Reader(e) => ProviderError::Reader(f(e)),
        }
    }
}
