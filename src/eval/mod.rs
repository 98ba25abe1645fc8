//! Evaluator dispatch (§4.1): routes an [`Operator`] evaluation to the
//! single-item or sequence evaluator based on its matcher shape.
//!
//! Both evaluators advance the provider's stream cursor themselves whenever
//! [`ConsumptionBehavior::can_take`] holds — there is no external facade
//! that owes a `Provider::drop` call after the fact. `EvalState::used`
//! reports how many source elements were consumed (including alignment
//! padding) purely for the caller's own bookkeeping.
//!
//! The two evaluators reach that point differently:
//!
//! - [`single::evaluate`] matches exactly one element, always returned by
//!   value (`T: Copy`) rather than as a live borrow, so calling
//!   `Provider::drop` once at the end of the match is trivial.
//! - [`sequence::evaluate`] accumulates a run of elements one at a time. A
//!   streaming [`Reader`] only ever exposes elements at or after its current
//!   front, so dropping one element makes every earlier one permanently
//!   unaddressable through the provider. Under a take-variant behavior the
//!   sequence evaluator therefore forces its accumulator into an owned
//!   scratch buffer from the very first append and drops each element
//!   immediately after appending it — never deferring to a final bulk drop,
//!   which would require re-reading already-dropped positions to build a
//!   view.
//!
//! [`ConsumptionBehavior::StreamDrop`] is simply the `discards()` case of
//! this same per-element drop discipline: the value is thrown away, but the
//! cursor still advances the identical amount.

pub mod filter_read;
pub mod sequence;
pub mod single;

use crate::behavior::ConsumptionBehavior;
use crate::error::ProviderError;
use crate::operator::{Match, Operator};
use crate::processor::Evaluated;
use crate::provider::{Provider, Reader};
use crate::state::Outcome;

/// Evaluates `operator` against `provider` starting at `offset`.
///
/// Selects [`single::evaluate`] or [`sequence::evaluate`] based on whether
/// `operator.match_spec` is [`Match::Single`] or [`Match::Sequence`].
///
/// # Errors
///
/// Propagates [`ProviderError`] from any `reserve` call the evaluator needs
/// to make to read far enough ahead.
pub fn dispatch<'p, T, O, R>(
    operator: &Operator<T, O>,
    provider: &'p mut Provider<'_, T, R>,
    offset: usize,
    behavior: ConsumptionBehavior,
) -> Result<Outcome<Evaluated<'p, T, O>>, ProviderError<R::Error>>
where
    T: Copy,
    R: Reader<T>,
{
    match &operator.match_spec {
        Match::Single(matcher) => single::evaluate(operator, matcher, provider, offset, behavior),
        Match::Sequence(matcher) => sequence::evaluate(operator, matcher, provider, offset, behavior),
    }
}
