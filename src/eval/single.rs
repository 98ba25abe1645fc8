//! Single-item evaluator (§4.2): matches one element at a time.
//!
//! Alignment padding is skipped (counted into `used`), then the element is
//! read (through the filter, if one is attached), tested against the
//! matcher's predicate — unless the filter already substituted the value,
//! in which case the predicate is skipped entirely, since the filter already
//! validated it — optionally resolved, and handed to the processing mode the
//! outer [`ConsumptionBehavior`] selects. A take-variant behavior drops the
//! consumed span from the provider before returning.
//!
//! A single matched element is always returned by value
//! ([`Evaluated::Item`]) rather than as a slice — a `T: Copy` scalar has no
//! meaningful borrowed-vs-owned distinction to draw, unlike the sequence
//! evaluator's accumulated run of elements.

use crate::behavior::ConsumptionBehavior;
use crate::error::ProviderError;
use crate::operator::{align_up, Operator, Resolve, ResolveBehavior, SingleMatch};
use crate::processor::Evaluated;
use crate::provider::{Provider, Reader};
use crate::state::{EvalState, Outcome};

use super::filter_read::{self, FilterDecision};

pub(crate) fn evaluate<'p, T, O, R>(
    operator: &Operator<T, O>,
    matcher: &SingleMatch<T>,
    provider: &'p mut Provider<'_, T, R>,
    offset: usize,
    behavior: ConsumptionBehavior,
) -> Result<Outcome<Evaluated<'p, T, O>>, ProviderError<R::Error>>
where
    T: Copy,
    R: Reader<T>,
{
    let abs = provider.consumed_count() + offset;
    let padding = operator.alignment.map_or(0, |align| align_up(abs, align) - abs);
    let read_offset = offset + padding;

    let (item, read_used, filter_owned, substituted) = match &operator.filter {
        None => {
            provider.reserve_item(read_offset)?;
            (provider.view_item(read_offset), 1, false, false)
        }
        Some((filter, filter_behavior)) => {
            match filter_read::apply(filter, *filter_behavior, behavior, provider, read_offset)? {
                FilterDecision::ReadRaw => {
                    provider.reserve_item(read_offset)?;
                    (provider.view_item(read_offset), 1, false, false)
                }
                FilterDecision::Filtered { value, used, substitute } => {
                    if substitute {
                        (value, used, true, true)
                    } else {
                        provider.reserve_item(read_offset)?;
                        (provider.view_item(read_offset), 1, false, false)
                    }
                }
                FilterDecision::StopClean | FilterDecision::Reject => return Ok(Outcome::Fail),
            }
        }
    };

    // A substituted filter value has already been validated by the filter
    // itself (§4.2); the outer predicate is only consulted for a raw read.
    if !substituted && !(matcher.predicate)(&item) {
        return Ok(Outcome::Fail);
    }

    let used = padding + read_used;

    if behavior.can_take() {
        provider.drop(used);
    }

    if behavior.discards() {
        return Ok(Outcome::Discard);
    }

    let owned = filter_owned || behavior.always_allocates();

    match &operator.resolve {
        None => Ok(Outcome::Ok(wrap(item, used, owned))),
        Some(Resolve::Whole { behavior: rb, func }) => {
            match func(core::slice::from_ref(&item)) {
                Some(value) => Ok(Outcome::Ok(EvalState::owned(Evaluated::Resolved(value), used))),
                None if matches!(rb, ResolveBehavior::Safe) => Ok(Outcome::Ok(wrap(item, used, owned))),
                None => Ok(Outcome::Fail),
            }
        }
        Some(Resolve::Slice { .. }) => {
            unreachable!("OperatorBuilder forbids slice resolvers on Match::Single operators")
        }
        Some(Resolve::PerElement { .. }) => {
            unreachable!("OperatorBuilder forbids per-element resolve behaviors on Match::Single operators")
        }
    }
}

fn wrap<'p, T, O>(item: T, used: usize, owned: bool) -> EvalState<Evaluated<'p, T, O>> {
    if owned {
        EvalState::owned(Evaluated::Item(item), used)
    } else {
        EvalState::borrowed(Evaluated::Item(item), used)
    }
}
