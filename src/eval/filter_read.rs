//! Filter-aware recursive read (§4.5).
//!
//! A filter attached to an operator is itself a [`FilterOperator`] — an
//! ordinary operator whose own `filter` field is `None` — evaluated through
//! the very same [`dispatch`](crate::eval::dispatch) core. It is always
//! projected to its non-consuming twin via the *outer* evaluation's own
//! [`ConsumptionBehavior::as_view`], since a filter read decides what the
//! outer evaluator should do; it never advances the provider's cursor on its
//! own, regardless of whether the outer evaluation is viewing or taking.

use alloc::vec::Vec;

use crate::behavior::ConsumptionBehavior;
use crate::error::ProviderError;
use crate::operator::{FilterBehavior, FilterOperator};
use crate::processor::Evaluated;
use crate::provider::{Provider, Reader};
use crate::state::Outcome;

/// What a filter-aware read decided for the outer evaluator to act on.
pub(crate) enum FilterDecision<T> {
    /// No filter is attached, or the filter failed and its behavior falls
    /// back to an unfiltered read: proceed reading the raw element(s)
    /// directly.
    ReadRaw,
    /// The filter matched. `value` is its resolved output (one element);
    /// `used` is how many underlying source elements it consumed to produce
    /// it (which may differ from `1` — e.g. an escape-sequence filter
    /// consuming several raw bytes to produce one decoded element).
    /// `substitute` is `true` when the filter's value should be substituted
    /// outright for the outer matcher ([`FilterBehavior::substitutes_on_success`]),
    /// which also means the outer matcher/verdict call must be skipped
    /// entirely (it was already validated by the filter); `false` means the
    /// outer matcher must still decide on this value.
    Filtered {
        /// The filter's matched element.
        value: T,
        /// Source elements the filter consumed.
        used: usize,
        /// Substitute outright (and skip the outer matcher) vs. merely
        /// validate.
        substitute: bool,
    },
    /// The filter matched for a [`FilterBehavior::breaks_sequence`] behavior:
    /// the outer evaluation should terminate cleanly here rather than
    /// continue or hard-fail.
    StopClean,
    /// The filter's outcome is an unrecoverable rejection for the outer
    /// operator.
    Reject,
}

/// Runs `filter` at `offset` (via `outer.as_view()`) and composes its
/// outcome with `filter_behavior` into a [`FilterDecision`].
///
/// # Errors
///
/// Propagates [`ProviderError`] from the filter's own `reserve` calls.
pub(crate) fn apply<T, R>(
    filter: &FilterOperator<T>,
    filter_behavior: FilterBehavior,
    outer: ConsumptionBehavior,
    provider: &mut Provider<'_, T, R>,
    offset: usize,
) -> Result<FilterDecision<T>, ProviderError<R::Error>>
where
    T: Copy,
    R: Reader<T>,
{
    let outcome = super::dispatch(filter, provider, offset, outer.as_view())?;
    Ok(match outcome {
        Outcome::Ok(state) => {
            if filter_behavior.breaks_sequence() {
                FilterDecision::StopClean
            } else {
                let elements = materialize(state.value);
                single_or_reject(elements, state.used, filter_behavior.substitutes_on_success())
            }
        }
        Outcome::Fail | Outcome::Discard => {
            if filter_behavior.falls_back_on_failure() {
                FilterDecision::ReadRaw
            } else {
                FilterDecision::Reject
            }
        }
    })
}

/// A filter is always single-valued per read (a [`FilterOperator`] matches
/// exactly one outer element's worth of input); more or fewer elements is a
/// rejection rather than a panic, since it can only happen if a caller
/// composed an ill-shaped filter.
fn single_or_reject<T>(mut elements: Vec<T>, used: usize, substitute: bool) -> FilterDecision<T> {
    if elements.len() == 1 {
        FilterDecision::Filtered {
            value: elements.pop().expect("length checked above"),
            used,
            substitute,
        }
    } else {
        FilterDecision::Reject
    }
}

fn materialize<T: Copy>(value: Evaluated<'_, T, T>) -> Vec<T> {
    match value {
        Evaluated::Item(item) | Evaluated::Resolved(item) => alloc::vec![item],
        Evaluated::View(slice) => slice.to_vec(),
        Evaluated::Owned(vec) => vec,
    }
}
