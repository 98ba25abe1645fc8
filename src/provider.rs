//! [`Provider`]: the abstraction over a byte (or other `Copy` element) source,
//! in either direct-slice or streaming-reader form.

use crate::error::ProviderError;

/// The streaming half of a [`Provider`].
///
/// A reader owns an unbounded source of elements and a bounded lookahead
/// buffer; `reserve` asks it to grow that lookahead buffer up to a requested
/// offset, `peek_*` borrows already-reserved elements, `drop` discards
/// elements from the front (advancing the logical cursor), and
/// `consumed_count` reports the reader's absolute position.
pub trait Reader<T> {
    /// The reader's own I/O error type.
    type Error;

    /// Ensures at least `offset + 1` elements (relative to the reader's
    /// current front) are buffered and available to `peek_item`.
    ///
    /// Returns `Ok(true)` once buffered, `Ok(false)` if the source is
    /// cleanly exhausted before `offset` could be reached (the provider
    /// translates this into [`ProviderError::EndOfStream`]).
    ///
    /// # Errors
    ///
    /// Returns the reader's own error if the underlying source failed.
    fn reserve_item(&mut self, offset: usize) -> Result<bool, Self::Error> {
        self.reserve_slice(offset, 1)
    }

    /// Ensures at least `offset + len` elements are buffered.
    ///
    /// See [`reserve_item`](Self::reserve_item) for the return-value
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns the reader's own error if the underlying source failed.
    fn reserve_slice(&mut self, offset: usize, len: usize) -> Result<bool, Self::Error>;

    /// Borrows the element at `offset` after a successful reserve.
    ///
    /// # Panics
    ///
    /// May panic or return garbage if `offset` was not covered by a prior
    /// successful `reserve_item`/`reserve_slice` call.
    fn peek_item(&self, offset: usize) -> T;

    /// Borrows `len` elements starting at `offset` after a successful
    /// reserve.
    fn peek_slice(&self, offset: usize, len: usize) -> &[T];

    /// Advances the reader's cursor by `n` elements, discarding them.
    fn drop(&mut self, n: usize);

    /// The number of elements the reader has logically discarded via
    /// `drop` so far (its absolute position).
    fn consumed_count(&self) -> usize;
}

/// Wraps either a complete in-memory slice or a bounded streaming
/// [`Reader`].
pub enum Provider<'p, T, R: Reader<T>> {
    /// A full, already-available slice. Offsets are relative to its start;
    /// `drop` is always a no-op.
    Direct(&'p [T]),
    /// A streaming reader with a bounded lookahead window. Offsets are
    /// relative to the reader's current front, i.e. to its `consumed_count`.
    Stream(&'p mut R),
}

impl<'p, T: Copy, R: Reader<T>> Provider<'p, T, R> {
    /// `true` for [`Provider::Direct`].
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    /// Ensures the element at `offset` is available.
    ///
    /// For a direct slice this is a bounds check; for a stream this asks the
    /// reader to buffer up to the requested offset.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::EndOfStream`] if `offset` is past the end of
    /// a direct slice, or [`ProviderError::Reader`]/`EndOfStream` if the
    /// reader could not buffer that far.
    pub fn reserve_item(&mut self, offset: usize) -> Result<(), ProviderError<R::Error>> {
        self.reserve_slice(offset, 1)
    }

    /// Ensures `[offset, offset + len)` is available.
    ///
    /// # Errors
    ///
    /// See [`reserve_item`](Self::reserve_item).
    pub fn reserve_slice(
        &mut self,
        offset: usize,
        len: usize,
    ) -> Result<(), ProviderError<R::Error>> {
        match self {
            Self::Direct(slice) => {
                if offset.checked_add(len).is_some_and(|end| end <= slice.len()) {
                    Ok(())
                } else {
                    Err(ProviderError::EndOfStream)
                }
            }
            Self::Stream(reader) => match reader.reserve_slice(offset, len) {
                Ok(true) => Ok(()),
                Ok(false) => Err(ProviderError::EndOfStream),
                Err(e) => Err(ProviderError::Reader(e)),
            },
        }
    }

    /// Borrows the element at `offset` after a successful reserve.
    #[must_use]
    pub fn view_item(&self, offset: usize) -> T {
        match self {
            Self::Direct(slice) => slice[offset],
            Self::Stream(reader) => reader.peek_item(offset),
        }
    }

    /// Borrows `[offset, offset + len)` after a successful reserve.
    #[must_use]
    pub fn view_slice(&self, offset: usize, len: usize) -> &[T] {
        match self {
            Self::Direct(slice) => &slice[offset..offset + len],
            Self::Stream(reader) => reader.peek_slice(offset, len),
        }
    }

    /// Advances the stream cursor by `n` elements. No-op for a direct slice.
    pub fn drop(&mut self, n: usize) {
        if let Self::Stream(reader) = self {
            reader.drop(n);
        }
    }

    /// The provider's absolute consumed-element count: always `0` for a
    /// direct slice (it has no persistent cursor of its own), or the
    /// reader's `consumed_count` for a stream.
    #[must_use]
    pub fn consumed_count(&self) -> usize {
        match self {
            Self::Direct(_) => 0,
            Self::Stream(reader) => reader.consumed_count(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_reader {
    use alloc::vec::Vec;
    use core::convert::Infallible;

    use super::Reader;

    /// A minimal in-memory streaming reader used by tests: the whole source
    /// is available up front, but `reserve` still enforces bounds and
    /// `drop` still advances a real cursor, so it exercises the streaming
    /// path without needing real I/O.
    #[derive(Debug, Default)]
    pub(crate) struct VecReader {
        data: Vec<u8>,
        consumed: usize,
    }

    impl VecReader {
        pub(crate) fn new(data: impl Into<Vec<u8>>) -> Self {
            Self {
                data: data.into(),
                consumed: 0,
            }
        }
    }

    impl Reader<u8> for VecReader {
        type Error = Infallible;

        fn reserve_slice(&mut self, offset: usize, len: usize) -> Result<bool, Self::Error> {
            Ok(self.consumed + offset + len <= self.data.len())
        }

        fn peek_item(&self, offset: usize) -> u8 {
            self.data[self.consumed + offset]
        }

        fn peek_slice(&self, offset: usize, len: usize) -> &[u8] {
            &self.data[self.consumed + offset..self.consumed + offset + len]
        }

        fn drop(&mut self, n: usize) {
            self.consumed += n;
        }

        fn consumed_count(&self) -> usize {
            self.consumed
        }
    }
}
