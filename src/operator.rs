//! The [`Operator`] data model: a compile-time-composable description of one
//! parsing step — a matcher, an optional pre-filter, an optional resolver,
//! an alignment requirement, and a scratch-buffer size hint.
//!
//! Nothing in this module evaluates an operator against a
//! [`Provider`](crate::provider::Provider); see [`crate::eval`] for that.

use alloc::boxed::Box;

/// Verdict produced by a [`SequenceMatch`] for one element at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep matching; the element is part of the sequence.
    Next,
    /// Terminate, including the current element in the result.
    DoneInclude,
    /// Terminate, excluding the current element from the result.
    ///
    /// Asserts `i > 0`: an exclusive terminal verdict at index zero is an
    /// invariant violation, not a legitimate empty match (see design note
    /// in the top-level specification).
    DoneExclude,
    /// Reject the whole sequence.
    Invalid,
}

/// Discipline used for the scratch buffer a [`sequence`](crate::eval::sequence)
/// evaluation may need to activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchHint {
    /// Uninitialized fixed-size buffer of `n` elements; no bounds-tracking
    /// beyond `n`.
    Exact(usize),
    /// Length-tracked buffer capped at `n` elements; allocated once.
    Bound(usize),
    /// Unbounded, grow-on-append.
    Dynamic,
}

/// How a [`FilterOperator`]'s outcome composes with the outer matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterBehavior {
    /// A filter failure propagates as the outer operator's failure.
    Fail,
    /// A filter failure falls back to reading the unfiltered bytes and
    /// applying the outer matcher to them.
    Fallback,
    /// A filter success is used as the matched value outright, skipping the
    /// outer matcher entirely.
    Override,
    /// A filter failure propagates as failure; a filter success is passed
    /// to the outer matcher rather than substituted for it.
    Validate,
    /// Inverted: a filter success is a rejection (the outer operator
    /// requires the filter to *not* match); a filter failure falls through
    /// to the unfiltered path.
    Unless,
}

impl FilterBehavior {
    /// A filter success is substituted for the read value (as opposed to
    /// merely validated) for [`Override`](Self::Override).
    #[must_use]
    pub const fn substitutes_on_success(self) -> bool {
        matches!(self, Self::Override)
    }

    /// On filter failure, whether to fall back to an unfiltered read rather
    /// than propagate the failure. True for [`Fallback`](Self::Fallback),
    /// [`Override`](Self::Override), and [`Unless`](Self::Unless) — a
    /// distinct axis from [`Self::breaks_sequence`], which is about what a
    /// filter *success* means for `Unless`.
    #[must_use]
    pub const fn falls_back_on_failure(self) -> bool {
        matches!(self, Self::Fallback | Self::Override | Self::Unless)
    }

    /// `true` for the filter behaviors whose read *success* is a clean
    /// terminal for the calling evaluation (drives `resolveExclude`) rather
    /// than a substituted or validated value.
    ///
    /// This is the named compile-time property referenced in the top-level
    /// specification's design notes: checked by
    /// [`filter_read::apply`](crate::eval::filter_read::apply) on the
    /// filter's success branch, ahead of the substitute/validate split.
    /// Empirically true for `Unless`, which is how "read until a delimiter"
    /// patterns are expressed (the filter recognizes the delimiter; finding
    /// it is a breaking but non-fatal end of the sequence).
    #[must_use]
    pub const fn breaks_sequence(self) -> bool {
        matches!(self, Self::Unless)
    }
}

/// How a [`Resolve`]'s declared function composes with the matched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveBehavior {
    /// Resolve the whole accumulated input once, at the very end; a
    /// rejection falls back to returning the unresolved input.
    Safe,
    /// Resolve the whole accumulated input once, at the very end; a
    /// rejection fails the whole operator.
    Fail,
    /// Resolve the accumulated prefix after every element; the first
    /// successful resolution short-circuits the sequence.
    Partial,
    /// Like [`Partial`](Self::Partial), but does not attempt resolution
    /// until at least `usize` elements have accumulated.
    PartialDefer(usize),
    /// Resolve each element independently as it is appended; a rejection
    /// falls back to the original element.
    EachSafe,
    /// Resolve each element independently as it is appended; a rejection
    /// fails the whole operator.
    EachFail,
}

impl ResolveBehavior {
    /// `true` for [`EachSafe`](Self::EachSafe)/[`EachFail`](Self::EachFail),
    /// which resolve one element at a time rather than the whole
    /// accumulated input.
    #[must_use]
    pub const fn is_per_element(self) -> bool {
        matches!(self, Self::EachSafe | Self::EachFail)
    }

    /// `true` when rejection should fail the whole operator rather than
    /// fall back to the unresolved input.
    #[must_use]
    pub const fn rejection_is_fatal(self) -> bool {
        matches!(self, Self::Fail | Self::EachFail)
    }
}

/// A resolver function paired with the [`ResolveBehavior`] that governs how
/// its result composes with the matched input.
///
/// Three function shapes exist, selected by the behavior:
/// - [`ResolveBehavior::Safe`]/[`Fail`](ResolveBehavior::Fail)/
///   [`Partial`](ResolveBehavior::Partial)/
///   [`PartialDefer`](ResolveBehavior::PartialDefer) most naturally narrow
///   the accumulated slice to a sub-slice of itself (`for<'a> &'a [T] ->
///   Option<&'a [T]>`) — trimming, splitting on a delimiter, and similar.
///   This is [`Resolve::Slice`]; its output is, by construction, always
///   either the whole input or some region of it, which is exactly the
///   input [`crate::processor::values_overlap`] needs.
/// - The same behaviors can instead produce a wholly detached value
///   unrelated to the source bytes (`&[T] -> Option<O>`) — parsing an
///   integer out of the matched digits, for instance. This is
///   [`Resolve::Whole`]; its output never aliases the working buffer, so no
///   overlap analysis applies to it.
/// - [`ResolveBehavior::EachSafe`]/[`EachFail`](ResolveBehavior::EachFail)
///   resolve one element at a time (`&T -> Option<T>`), used only by the
///   sequence evaluator. This is [`Resolve::PerElement`].
pub enum Resolve<T, O> {
    /// Resolves the accumulated slice to a sub-slice of itself.
    Slice {
        /// Composition rule; must not be [`ResolveBehavior::is_per_element`].
        behavior: ResolveBehavior,
        /// `for<'a> &'a [T] -> Option<&'a [T]>`.
        func: Box<dyn for<'a> Fn(&'a [T]) -> Option<&'a [T]>>,
    },
    /// Resolves the accumulated slice into a detached value.
    Whole {
        /// Composition rule; must not be [`ResolveBehavior::is_per_element`].
        behavior: ResolveBehavior,
        /// `&[T] -> Option<O>`.
        func: Box<dyn Fn(&[T]) -> Option<O>>,
    },
    /// Resolves a single element at a time.
    PerElement {
        /// Composition rule; must be [`ResolveBehavior::is_per_element`].
        behavior: ResolveBehavior,
        /// `&T -> Option<T>`.
        func: Box<dyn Fn(&T) -> Option<T>>,
    },
}

impl<T, O> Resolve<T, O> {
    /// Builds a slice-narrowing resolver.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if `behavior` is per-element.
    pub fn slice(
        behavior: ResolveBehavior,
        func: impl for<'a> Fn(&'a [T]) -> Option<&'a [T]> + 'static,
    ) -> Self {
        debug_assert!(!behavior.is_per_element(), "slice resolver given a per-element behavior");
        Self::Slice {
            behavior,
            func: Box::new(func),
        }
    }

    /// Builds a whole-input resolver producing a detached value.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if `behavior` is per-element.
    pub fn whole(behavior: ResolveBehavior, func: impl Fn(&[T]) -> Option<O> + 'static) -> Self {
        debug_assert!(!behavior.is_per_element(), "whole resolver given a per-element behavior");
        Self::Whole {
            behavior,
            func: Box::new(func),
        }
    }

    /// Builds a per-element resolver.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if `behavior` is not per-element.
    pub fn per_element(behavior: ResolveBehavior, func: impl Fn(&T) -> Option<T> + 'static) -> Self {
        debug_assert!(behavior.is_per_element(), "per-element resolver given a whole-input behavior");
        Self::PerElement {
            behavior,
            func: Box::new(func),
        }
    }

    /// The governing [`ResolveBehavior`], regardless of shape.
    #[must_use]
    pub const fn behavior(&self) -> ResolveBehavior {
        match self {
            Self::Slice { behavior, .. }
            | Self::Whole { behavior, .. }
            | Self::PerElement { behavior, .. } => *behavior,
        }
    }
}

/// A single-element predicate, carrying a capacity hint for the caller's own
/// scratch/allocation planning (not interpreted by the core itself beyond
/// dispatch).
pub struct SingleMatch<T> {
    /// `(T) -> bool`.
    pub predicate: Box<dyn Fn(&T) -> bool>,
    /// Capacity hint; opaque to the evaluator.
    pub capacity_hint: usize,
}

/// A sequence verdict function: `(index, element) -> Verdict`.
pub struct SequenceMatch<T> {
    /// `(usize, &T) -> Verdict`.
    pub verdict: Box<dyn Fn(usize, &T) -> Verdict>,
    /// Capacity hint; opaque to the evaluator.
    pub capacity_hint: usize,
}

/// Either shape of matcher an [`Operator`] can carry. The dispatch layer
/// (§4.1) selects the single-item or sequence evaluator based on which
/// variant is present.
pub enum Match<T> {
    /// Matched by one call per element; dispatches to
    /// [`eval::single`](crate::eval::single).
    Single(SingleMatch<T>),
    /// Matched iteratively with a terminal verdict; dispatches to
    /// [`eval::sequence`](crate::eval::sequence).
    Sequence(SequenceMatch<T>),
}

impl<T> Match<T> {
    /// The capacity hint carried by either shape.
    #[must_use]
    pub const fn capacity_hint(&self) -> usize {
        match self {
            Self::Single(m) => m.capacity_hint,
            Self::Sequence(m) => m.capacity_hint,
        }
    }
}

/// A filter is a nested operator whose own `filter` field must be `None`
/// (nested filters are forbidden by design, see the top-level
/// specification's design notes) and whose output type matches the outer
/// operator's input type `T`, since a substituted (`Override`) value must
/// still be comparable by the outer matcher.
pub type FilterOperator<T> = Operator<T, T>;

/// A compile-time-composed description of one parsing step: a matcher, an
/// optional pre-filter, an optional resolver, an alignment requirement, and
/// a scratch-buffer size hint.
///
/// `T` is the element type (commonly `u8`); `O` is the operator's output
/// type, which may be `T` itself, a slice of `T`, or whatever the resolver
/// produces.
pub struct Operator<T, O> {
    /// The matcher: single predicate or sequence verdict function.
    pub match_spec: Match<T>,
    /// An optional pre-filter; see [`FilterBehavior`].
    pub filter: Option<(Box<FilterOperator<T>>, FilterBehavior)>,
    /// An optional resolver transforming matched input into `O`.
    pub resolve: Option<Resolve<T, O>>,
    /// Required alignment, as a multiple of the absolute source position.
    pub alignment: Option<usize>,
    /// Scratch buffer discipline used if this operator's evaluation needs
    /// one.
    pub scratch_hint: ScratchHint,
}

impl<T, O> Operator<T, O> {
    /// `true` if this operator's matcher is a [`Match::Sequence`].
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self.match_spec, Match::Sequence(_))
    }
}

/// Rounds `offset` up to the next multiple of `align` (or returns `offset`
/// unchanged if it is already aligned, or if `align` is `0`/`1`).
#[must_use]
pub const fn align_up(offset: usize, align: usize) -> usize {
    if align <= 1 {
        return offset;
    }
    let rem = offset % align;
    if rem == 0 {
        offset
    } else {
        offset + (align - rem)
    }
}

/// Ergonomic construction for [`Operator`], mirroring the `#[derive(Default)]`
/// options-struct convention used for this engine's sibling ambient types:
/// `alignment` defaults to `None`, `scratch_hint` to
/// [`ScratchHint::Dynamic`]. This is the compile-time "configuration" layer
/// for operators — there is no runtime config surface, since every operator
/// is a value composed once at its call site.
pub struct OperatorBuilder<T, O> {
    match_spec: Match<T>,
    filter: Option<(Box<FilterOperator<T>>, FilterBehavior)>,
    resolve: Option<Resolve<T, O>>,
    alignment: Option<usize>,
    scratch_hint: ScratchHint,
}

impl<T, O> OperatorBuilder<T, O> {
    /// Starts building an operator around the given matcher.
    #[must_use]
    pub fn new(match_spec: Match<T>) -> Self {
        Self {
            match_spec,
            filter: None,
            resolve: None,
            alignment: None,
            scratch_hint: ScratchHint::Dynamic,
        }
    }

    /// Attaches a pre-filter.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if `filter` itself has a filter set — nested
    /// filters are forbidden.
    #[must_use]
    pub fn filter(mut self, filter: FilterOperator<T>, behavior: FilterBehavior) -> Self {
        debug_assert!(filter.filter.is_none(), "filters must not themselves carry a filter");
        self.filter = Some((Box::new(filter), behavior));
        self
    }

    /// Attaches a resolver.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if the resolver's behavior is
    /// [`ResolveBehavior::Partial`]/[`PartialDefer`](ResolveBehavior::PartialDefer)/
    /// [`EachSafe`](ResolveBehavior::EachSafe)/[`EachFail`](ResolveBehavior::EachFail)
    /// on a [`Match::Single`] operator — those behaviors only make sense
    /// mid-loop over a sequence.
    #[must_use]
    pub fn resolve(mut self, resolve: Resolve<T, O>) -> Self {
        debug_assert!(
            matches!(self.match_spec, Match::Sequence(_))
                || matches!(resolve.behavior(), ResolveBehavior::Safe | ResolveBehavior::Fail),
            "partial/deferred/per-element resolve behaviors require a sequence matcher"
        );
        debug_assert!(
            matches!(self.match_spec, Match::Sequence(_)) || !matches!(resolve, Resolve::Slice { .. }),
            "a slice-narrowing resolver cannot soundly return a view into a single matched \
             element's transient storage; use Resolve::whole on a Match::Single operator"
        );
        self.resolve = Some(resolve);
        self
    }

    /// Sets the required alignment.
    #[must_use]
    pub const fn alignment(mut self, alignment: usize) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Overrides the default [`ScratchHint::Dynamic`].
    #[must_use]
    pub const fn scratch_hint(mut self, hint: ScratchHint) -> Self {
        self.scratch_hint = hint;
        self
    }

    /// Finishes construction.
    #[must_use]
    pub fn build(self) -> Operator<T, O> {
        Operator {
            match_spec: self.match_spec,
            filter: self.filter,
            resolve: self.resolve,
            alignment: self.alignment,
            scratch_hint: self.scratch_hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_multiple() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 4), 8);
    }

    #[test]
    fn align_up_is_identity_for_no_alignment() {
        assert_eq!(align_up(7, 0), 7);
        assert_eq!(align_up(7, 1), 7);
    }

    #[test]
    fn builder_defaults() {
        let op: Operator<u8, u8> = OperatorBuilder::new(Match::Single(SingleMatch {
            predicate: Box::new(|_| true),
            capacity_hint: 1,
        }))
        .build();
        assert!(op.alignment.is_none());
        assert!(matches!(op.scratch_hint, ScratchHint::Dynamic));
        assert!(op.filter.is_none());
        assert!(op.resolve.is_none());
    }
}
