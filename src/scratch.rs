//! The scratch buffer: the working area elements accumulate into when they
//! cannot be borrowed straight out of the [`Provider`](crate::provider::Provider).
//!
//! Three storage modes are supported, selected per-operator by
//! [`ScratchHint`](crate::operator::ScratchHint):
//!
//! - [`Scratch::Exact`] — an uninitialized fixed-size buffer indexed by
//!   position, with no bounds-tracking beyond its declared size.
//! - [`Scratch::Bound`] — a length-tracked buffer capped at a declared size,
//!   allocated once and never grown.
//! - [`Scratch::Dynamic`] — an unbounded, grow-on-append list.
//!
//! All three expose the same four operations: append a single item, append a
//! slice, view the accumulated elements, and consume the buffer into an owned
//! slice. Elements are required to be [`Copy`] so that the exact-mode buffer
//! never has to run element destructors over its uninitialized tail.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::MaybeUninit;

/// The working buffer an evaluator accumulates matched/resolved elements
/// into once they diverge from the source the [`Provider`](crate::provider::Provider)
/// is backed by.
#[derive(Debug)]
pub enum Scratch<T> {
    /// Fixed-size, uninitialized until written; see [`ExactScratch`].
    Exact(ExactScratch<T>),
    /// Fixed-capacity, length-tracked; see [`BoundScratch`].
    Bound(BoundScratch<T>),
    /// Unbounded, grow-on-append; a plain `Vec<T>`.
    Dynamic(Vec<T>),
}

impl<T: Copy> Scratch<T> {
    /// Builds a new scratch buffer for the given capacity hint.
    #[must_use]
    pub fn new(hint: crate::operator::ScratchHint) -> Self {
        match hint {
            crate::operator::ScratchHint::Exact(n) => Self::Exact(ExactScratch::new(n)),
            crate::operator::ScratchHint::Bound(n) => Self::Bound(BoundScratch::new(n)),
            crate::operator::ScratchHint::Dynamic => Self::Dynamic(Vec::new()),
        }
    }

    /// Appends a single element.
    ///
    /// # Panics
    ///
    /// Panics (via `debug_assert!` in debug builds; silently truncates in
    /// release) if an `Exact`/`Bound` buffer is already at capacity — the
    /// operator author is expected to have sized the hint correctly.
    pub fn append_item(&mut self, item: T) {
        match self {
            Self::Exact(e) => e.push(item),
            Self::Bound(b) => b.push(item),
            Self::Dynamic(v) => v.push(item),
        }
    }

    /// Appends a slice of elements.
    pub fn append_slice(&mut self, items: &[T]) {
        match self {
            Self::Exact(e) => {
                for &item in items {
                    e.push(item);
                }
            }
            Self::Bound(b) => {
                for &item in items {
                    b.push(item);
                }
            }
            Self::Dynamic(v) => v.extend_from_slice(items),
        }
    }

    /// Borrows the accumulated elements written so far.
    #[must_use]
    pub fn view(&self) -> &[T] {
        match self {
            Self::Exact(e) => e.as_slice(),
            Self::Bound(b) => b.as_slice(),
            Self::Dynamic(v) => v.as_slice(),
        }
    }

    /// Number of elements written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.view().len()
    }

    /// `true` if no elements have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the buffer, returning an owned `Vec<T>` of its contents.
    ///
    /// This is the buffer's only release path besides simply dropping it:
    /// every evaluator that activates scratch either calls this (transferring
    /// ownership into the outcome) or drops the `Scratch` value outright on
    /// the fail path.
    #[must_use]
    pub fn into_owned(self) -> Vec<T> {
        match self {
            Self::Exact(e) => e.into_vec(),
            Self::Bound(b) => b.data,
            Self::Dynamic(v) => v,
        }
    }
}

/// Uninitialized fixed-size buffer indexed by position.
///
/// No bounds-tracking is performed beyond the declared size `n`; callers are
/// responsible for not appending past it. Because `T: Copy`, the
/// uninitialized tail never needs a destructor run over it.
#[derive(Debug)]
pub struct ExactScratch<T> {
    buf: Box<[MaybeUninit<T>]>,
    len: usize,
}

impl<T: Copy> ExactScratch<T> {
    #[must_use]
    fn new(n: usize) -> Self {
        Self {
            buf: alloc::vec![MaybeUninit::uninit(); n].into_boxed_slice(),
            len: 0,
        }
    }

    fn push(&mut self, item: T) {
        debug_assert!(self.len < self.buf.len(), "ExactScratch overflow");
        if self.len < self.buf.len() {
            self.buf[self.len] = MaybeUninit::new(item);
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[T] {
        // SAFETY: the first `self.len` slots were written by `push` and
        // never overwritten with an uninitialized value afterwards.
        unsafe { core::slice::from_raw_parts(self.buf.as_ptr().cast::<T>(), self.len) }
    }

    fn into_vec(self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

/// Length-tracked buffer capped at a declared size; allocated once via
/// `Vec::with_capacity` and never grown past it.
#[derive(Debug)]
pub struct BoundScratch<T> {
    data: Vec<T>,
    cap: usize,
}

impl<T: Copy> BoundScratch<T> {
    #[must_use]
    fn new(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap),
            cap,
        }
    }

    fn push(&mut self, item: T) {
        debug_assert!(self.data.len() < self.cap, "BoundScratch overflow");
        if self.data.len() < self.cap {
            self.data.push(item);
        }
    }

    fn as_slice(&self) -> &[T] {
        &self.data
    }
}
