//! The [`Processor`]: ownership/overlap reasoning, conditional cloning,
//! discard, and release of the working buffer.
//!
//! This is the subtle half of the evaluation core. Given the input an
//! evaluator matched (a view into the provider, a scratch buffer, or an
//! already-owned value) and, optionally, a resolver's output, the processor
//! decides whether the final result can borrow the provider's buffer or
//! must be a heap allocation — and, when an allocation is unavoidable,
//! whether an already-allocated scratch buffer can simply be *transferred*
//! rather than copied again.

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::operator::ResolveBehavior;

/// The three processing modes a post-match value can be handed off in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ordinary processing: borrow if possible, otherwise allocate.
    Standard,
    /// The matched value is discarded outright
    /// ([`ConsumptionBehavior::StreamDrop`](crate::behavior::ConsumptionBehavior::StreamDrop)).
    Discard,
    /// The result must always be a heap-backed clone
    /// (`allocate() = always`).
    Clone,
}

/// Where the matched input currently lives, as reported by the evaluator.
///
/// Collapsed to two cases rather than three: a scratch buffer and an
/// already-owned allocation are handled identically from here on (both are
/// just transferred, never re-copied), so there is nothing to gain from
/// keeping them distinct once the evaluator hands off to the processor.
pub enum Ownership<'p, T> {
    /// Borrowed straight out of the provider's buffer.
    View(&'p [T]),
    /// Already a heap allocation — the evaluator's scratch buffer once it
    /// diverged from a contiguous view, or a separately-owned value (e.g.
    /// produced by a filter sub-evaluation). Transferred, not copied.
    Buffer(Vec<T>),
}

/// The result of [`Processor`] post-processing a matched value: a view, a
/// transferred/cloned owned slice, a resolver-produced value, or (for
/// single-item operators) the matched element itself.
///
/// This is the Rust-native sum-type rendering of the specification's
/// `owned` bit: [`Item`](Self::Item)/[`View`](Self::View) never require the
/// caller to release anything; [`Owned`](Self::Owned)/
/// [`Resolved`](Self::Resolved) are heap-backed and drop normally via
/// `Vec`'s/`O`'s own `Drop` impl.
pub enum Evaluated<'p, T, O = Infallible> {
    /// A single matched element, returned by value.
    Item(T),
    /// A borrowed view into the provider's buffer.
    View(&'p [T]),
    /// An owned slice of elements (post scratch-transfer or forced clone).
    Owned(Vec<T>),
    /// A resolver-produced value detached from the source buffer.
    Resolved(O),
}

impl<T, O> Evaluated<'_, T, O> {
    /// The specification's `owned` bit: `true` for
    /// [`Owned`](Self::Owned)/[`Resolved`](Self::Resolved).
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_) | Self::Resolved(_))
    }
}

/// How a resolver's output slice relates to its input slice, computed by
/// comparing raw byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Disjoint: the output does not alias the input at all.
    None,
    /// Identical pointer and length: the output *is* the input.
    Full,
    /// Overlaps the input but is not identical to it (e.g. a sub-slice).
    Partial,
}

/// Compares two slices' byte ranges. Returns [`Overlap::None`] whenever
/// either slice is empty, since an empty range never meaningfully aliases.
#[must_use]
pub fn values_overlap<T>(input: &[T], output: &[T]) -> Overlap {
    if input.is_empty() || output.is_empty() {
        return Overlap::None;
    }
    let i_start = input.as_ptr() as usize;
    let i_end = i_start + input.len() * core::mem::size_of::<T>();
    let o_start = output.as_ptr() as usize;
    let o_end = o_start + output.len() * core::mem::size_of::<T>();

    if i_start == o_start && i_end == o_end {
        Overlap::Full
    } else if o_start >= i_end || i_start >= o_end {
        Overlap::None
    } else {
        Overlap::Partial
    }
}

/// Ownership/overlap reasoning for one evaluation.
pub struct Processor {
    /// The processing mode selected for this evaluation (by the behavior
    /// in effect; see §4.2/§4.3 of the specification).
    pub mode: Mode,
}

impl Processor {
    /// Builds a processor for the given mode.
    #[must_use]
    pub const fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// No resolver: borrow if possible, otherwise allocate.
    ///
    /// [`Mode::Discard`] is handled by the caller before this is ever
    /// reached — both evaluators branch on `behavior.discards()` themselves
    /// so they can call `Provider::drop` at the right moment (see
    /// [`crate::eval`]'s module docs) — it is treated the same as
    /// [`Mode::Standard`] here, since the value this returns is about to be
    /// thrown away regardless.
    ///
    /// - [`Ownership::Buffer`]: already a heap allocation, so it is
    ///   transferred regardless of mode — there is no cheaper option to fall
    ///   back to by re-copying it.
    /// - [`Ownership::View`] under [`Mode::Clone`]: allocates a fresh copy.
    /// - [`Ownership::View`] otherwise: borrows the view as-is.
    ///
    /// Generic over `O`, even though it never produces
    /// [`Evaluated::Resolved`], so a caller juggling all three [`Resolve`]
    /// shapes (e.g. [`crate::eval::sequence`]'s `finalize`) can match on them
    /// and still get one coherent `ConsumeOutcome<'p, T, O>` out of every arm.
    #[must_use]
    pub fn consume_input<'p, T: Copy, O>(&self, ownership: Ownership<'p, T>) -> ConsumeOutcome<'p, T, O> {
        match ownership {
            Ownership::Buffer(buf) => ConsumeOutcome::Value(Evaluated::Owned(buf)),
            Ownership::View(view) => match self.mode {
                Mode::Clone => ConsumeOutcome::Value(Evaluated::Owned(clone_into_owned(view))),
                Mode::Standard | Mode::Discard => ConsumeOutcome::Value(Evaluated::View(view)),
            },
        }
    }

    /// With a slice-shaped resolver (`Fn(&[T]) -> Option<&[T]>`): runs it,
    /// then applies the subtle overlap-aware ownership decision from §4.4.
    ///
    /// - The resolver rejects (`None`):
    ///   - [`ResolveBehavior::Safe`] falls back to the same borrow-or-
    ///     transfer decision as [`consume_input`](Self::consume_input).
    ///   - [`ResolveBehavior::Fail`] (or any other behavior; only `Safe`
    ///     and `Fail` are valid here) fails, releasing `ownership`.
    /// - The resolver accepts: compute [`values_overlap`] between the
    ///   pre-resolve input and the returned slice.
    ///   - [`Overlap::Full`]: ownership by source — `View` stays a view;
    ///     `Buffer` transfers the existing `Vec` rather than copying again
    ///     (the output *is* the whole buffer).
    ///   - [`Overlap::None`] while `Mode::Standard` and the source is
    ///     `View`: the output is independent of the working buffer, so
    ///     borrowing it is safe.
    ///   - Otherwise (`Partial`, `None` under `Mode::Clone`, or a `Buffer`
    ///     source): release the working buffer and clone the output onto
    ///     the heap — transferring it would leave a dangling partial view.
    ///
    /// Generic over `O` for the same reason as
    /// [`consume_input`](Self::consume_input): this resolver shape never
    /// produces [`Evaluated::Resolved`] either.
    pub fn consume_resolved_slice<'p, T: Copy, O>(
        &self,
        ownership: Ownership<'p, T>,
        behavior: ResolveBehavior,
        resolve: &dyn for<'a> Fn(&'a [T]) -> Option<&'a [T]>,
    ) -> ConsumeOutcome<'p, T, O> {
        let input: &[T] = match &ownership {
            Ownership::View(view) => view,
            Ownership::Buffer(buf) => buf.as_slice(),
        };

        let Some(output) = resolve(input) else {
            return match behavior {
                ResolveBehavior::Safe => match ownership {
                    Ownership::View(view) => ConsumeOutcome::Value(Evaluated::View(view)),
                    Ownership::Buffer(buf) => ConsumeOutcome::Value(Evaluated::Owned(buf)),
                },
                _ => ConsumeOutcome::Fail,
            };
        };

        match values_overlap(input, output) {
            Overlap::Full => match ownership {
                Ownership::View(view) => ConsumeOutcome::Value(Evaluated::View(view)),
                Ownership::Buffer(buf) => {
                    debug_assert_eq!(buf.len(), output.len());
                    ConsumeOutcome::Value(Evaluated::Owned(buf))
                }
            },
            Overlap::None if matches!(self.mode, Mode::Standard) && matches!(ownership, Ownership::View(_)) => {
                ConsumeOutcome::Value(Evaluated::View(output))
            }
            Overlap::None | Overlap::Partial => {
                ConsumeOutcome::Value(Evaluated::Owned(clone_into_owned(output)))
            }
        }
    }

    /// With a value-shaped resolver (`Fn(&[T]) -> Option<O>`): the output
    /// never aliases the working buffer, so there is no overlap analysis —
    /// a successful resolution is always [`Evaluated::Resolved`].
    pub fn consume_resolved_value<'p, T: Copy, O>(
        &self,
        ownership: Ownership<'p, T>,
        behavior: ResolveBehavior,
        resolve: &dyn Fn(&[T]) -> Option<O>,
    ) -> ConsumeOutcome<'p, T, O> {
        let input: &[T] = match &ownership {
            Ownership::View(view) => view,
            Ownership::Buffer(buf) => buf.as_slice(),
        };

        match resolve(input) {
            Some(value) => ConsumeOutcome::Value(Evaluated::Resolved(value)),
            None => match behavior {
                ResolveBehavior::Safe => match ownership {
                    Ownership::View(view) => ConsumeOutcome::Value(Evaluated::View(view)),
                    Ownership::Buffer(buf) => ConsumeOutcome::Value(Evaluated::Owned(buf)),
                },
                _ => ConsumeOutcome::Fail,
            },
        }
    }
}

/// What a [`Processor`] call produced: a final value, a discard, or a
/// failure. Distinct from [`Outcome`](crate::state::Outcome) only in that
/// it carries an [`Evaluated`] rather than a plain `EvalState` — the caller
/// wraps this with `used`/`owned` bookkeeping to build the final `Outcome`.
pub enum ConsumeOutcome<'p, T, O = Infallible> {
    /// A final value was produced.
    Value(Evaluated<'p, T, O>),
    /// The value was discarded ([`Mode::Discard`]).
    Discard,
    /// The resolver rejected with a fatal behavior.
    Fail,
}

/// Allocates a fresh heap copy of `input`. A thin wrapper kept separate so
/// every "must clone" call site in this module reads the same way, and so a
/// future allocator-aware rewrite has one place to change.
#[must_use]
pub fn clone_into_owned<T: Copy>(input: &[T]) -> Vec<T> {
    input.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_full_for_identical_range() {
        let data = [1u8, 2, 3];
        assert_eq!(values_overlap(&data, &data), Overlap::Full);
    }

    #[test]
    fn overlap_partial_for_subslice() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(values_overlap(&data, &data[1..3]), Overlap::Partial);
    }

    #[test]
    fn overlap_none_for_disjoint() {
        let a = [1u8, 2, 3];
        let b = [4u8, 5, 6];
        assert_eq!(values_overlap(&a, &b), Overlap::None);
    }

    #[test]
    fn overlap_none_for_empty() {
        let a = [1u8, 2, 3];
        let empty: [u8; 0] = [];
        assert_eq!(values_overlap(&a, &empty), Overlap::None);
    }
}
