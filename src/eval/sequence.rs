//! Sequence evaluator (§4.3): matches a run of elements terminated by a
//! per-element [`Verdict`].
//!
//! Under a viewing behavior, the accumulated run starts as a
//! [`Pending::View`] — a length counter over a still-contiguous span of the
//! provider's own buffer — and is promoted to [`Pending::Scratch`] the first
//! time an element can no longer be represented that way: a filter
//! substituting a value whose raw footprint isn't exactly one element, or a
//! per-element resolver transforming an element in place. Promotion copies
//! the view's prefix into the scratch buffer once, then every subsequent
//! element is appended there directly.
//!
//! Under a take-variant behavior, `pending` is forced to [`Pending::Scratch`]
//! from the very first append, and every append immediately drops its
//! consumed span from the provider (§4.3's "Append discipline"). A
//! streaming [`Reader`] only ever exposes elements at or after its current
//! front, so once an element is dropped it becomes permanently unaddressable
//! through the provider — retroactively building a view over a span that
//! straddles a drop is not possible, hence forcing scratch up front rather
//! than promoting lazily.
//!
//! [`ResolveBehavior::Partial`]/[`PartialDefer`](ResolveBehavior::PartialDefer)
//! resolvers get a trial call after every appended element so a successful
//! resolution can short-circuit the loop; [`finalize`] then invokes the
//! resolver once more against the properly-lifetimed accumulated data. This
//! means such a resolver may run one extra time relative to the minimum
//! possible — an accepted simplification over threading a borrow out of the
//! loop, which `Provider`'s peek-relative-to-front contract does not allow
//! without either copying or fighting the borrow checker.

use crate::behavior::ConsumptionBehavior;
use crate::error::ProviderError;
use crate::operator::{align_up, Operator, Resolve, ResolveBehavior, SequenceMatch, Verdict};
use crate::processor::{ConsumeOutcome, Evaluated, Mode, Ownership, Processor};
use crate::provider::{Provider, Reader};
use crate::scratch::Scratch;
use crate::state::{EvalState, Outcome};

use super::filter_read::{self, FilterDecision};

/// The accumulated run's storage. Always [`Pending::Scratch`] under a
/// take-variant behavior (see the module docs); otherwise starts as
/// [`Pending::View`] and is promoted to scratch on first divergence.
enum Pending<T> {
    /// `len` elements starting at the evaluation's `start` offset.
    View { len: usize },
    /// Diverged from a contiguous view, or forced by a take-variant
    /// behavior; holds its own copy.
    Scratch(Scratch<T>),
}

pub(crate) fn evaluate<'p, T, O, R>(
    operator: &Operator<T, O>,
    matcher: &SequenceMatch<T>,
    provider: &'p mut Provider<'_, T, R>,
    offset: usize,
    behavior: ConsumptionBehavior,
) -> Result<Outcome<Evaluated<'p, T, O>>, ProviderError<R::Error>>
where
    T: Copy,
    R: Reader<T>,
{
    let take = behavior.can_take();

    let abs = provider.consumed_count() + offset;
    let padding = operator.alignment.map_or(0, |align| align_up(abs, align) - abs);

    // Under a take-variant behavior, padding is dropped immediately so every
    // subsequent read starts back at offset zero (§4.3); otherwise it is
    // remembered and added to every read offset.
    let start = if take {
        if padding > 0 {
            provider.drop(padding);
        }
        0
    } else {
        offset + padding
    };

    let mut pending = if take {
        Pending::Scratch(Scratch::new(operator.scratch_hint))
    } else {
        Pending::View { len: 0 }
    };
    let mut raw_pos = 0usize;
    let mut produced_index = 0usize;

    loop {
        let read_offset = if take { 0 } else { start + raw_pos };
        provider.reserve_item(read_offset)?;
        let raw_item = provider.view_item(read_offset);

        // `raw_diverges` is `true` whenever the stored element is not
        // guaranteed to be the single raw byte physically sitting at
        // `read_offset` — either a substituted filter value, or a validated
        // read whose filter examined more than one raw element to produce
        // it. `skip_verdict` mirrors a substituted value's already-validated
        // status: the outer verdict call is skipped entirely and treated as
        // an implicit `Next` (§4.3 step 4).
        let (stored_item, elem_used, raw_diverges, skip_verdict) = match &operator.filter {
            None => (raw_item, 1, false, false),
            Some((filter, filter_behavior)) => {
                match filter_read::apply(filter, *filter_behavior, behavior, provider, read_offset)? {
                    FilterDecision::ReadRaw => (raw_item, 1, false, false),
                    FilterDecision::Filtered { value, used, substitute } => {
                        if substitute {
                            (value, used, true, true)
                        } else {
                            (raw_item, used, used != 1, false)
                        }
                    }
                    FilterDecision::StopClean => break,
                    FilterDecision::Reject => return Ok(Outcome::Fail),
                }
            }
        };

        let verdict = if skip_verdict {
            Verdict::Next
        } else {
            (matcher.verdict)(produced_index, &stored_item)
        };

        match verdict {
            Verdict::Invalid => return Ok(Outcome::Fail),
            Verdict::DoneExclude => {
                debug_assert!(produced_index > 0, "DoneExclude verdict at index zero");
                break;
            }
            Verdict::DoneInclude => {
                if push(operator, &mut pending, provider, start, stored_item, raw_diverges, take, elem_used).is_err() {
                    return Ok(Outcome::Fail);
                }
                raw_pos += elem_used;
                break;
            }
            Verdict::Next => {
                if push(operator, &mut pending, provider, start, stored_item, raw_diverges, take, elem_used).is_err() {
                    return Ok(Outcome::Fail);
                }
                raw_pos += elem_used;
                produced_index += 1;

                if trial_resolve_succeeds(operator, &pending, provider, start) {
                    break;
                }
            }
        }
    }

    let used = padding + raw_pos;

    if behavior.discards() {
        // The padding and every appended element have already been dropped
        // (up front, and per-append respectively); no further drop is
        // needed here.
        return Ok(match finalize(operator, pending, provider, start, used, false) {
            Outcome::Ok(_) => Outcome::Discard,
            Outcome::Fail => Outcome::Fail,
            Outcome::Discard => Outcome::Discard,
        });
    }

    Ok(finalize(operator, pending, provider, start, used, behavior.always_allocates()))
}

/// Appends `item` to `pending`, promoting a [`Pending::View`] to
/// [`Pending::Scratch`] on first divergence (never under `take`, which is
/// already forced to scratch before the loop starts). `raw_diverges` carries
/// the caller's verdict on whether the raw read already diverged from a
/// contiguous view (a substituted filter value, or a multi-element validated
/// read); a successful per-element resolver transform also forces
/// divergence regardless of `raw_diverges`, since the resolved value no
/// longer matches what is physically at that position in the provider.
///
/// Under `take`, drops `elem_used` from the provider immediately after the
/// append (§4.3's "Append discipline") — this is what makes each subsequent
/// iteration's read offset zero.
///
/// Returns `Err(())` iff a per-element [`ResolveBehavior::EachFail`]
/// resolver rejected the element.
#[allow(clippy::too_many_arguments)]
fn push<T, O, R>(
    operator: &Operator<T, O>,
    pending: &mut Pending<T>,
    provider: &mut Provider<'_, T, R>,
    start: usize,
    item: T,
    raw_diverges: bool,
    take: bool,
    elem_used: usize,
) -> Result<(), ()>
where
    T: Copy,
    R: Reader<T>,
{
    let mut diverges = raw_diverges || take;
    let item = match &operator.resolve {
        Some(Resolve::PerElement { behavior, func }) => match func(&item) {
            Some(resolved) => {
                diverges = true;
                resolved
            }
            None if matches!(behavior, ResolveBehavior::EachSafe) => item,
            None => return Err(()),
        },
        _ => item,
    };

    match pending {
        Pending::Scratch(scratch) => scratch.append_item(item),
        Pending::View { len } if !diverges => *len += 1,
        Pending::View { len } => {
            let mut scratch = Scratch::new(operator.scratch_hint);
            if *len > 0 {
                scratch.append_slice(provider.view_slice(start, *len));
            }
            scratch.append_item(item);
            *pending = Pending::Scratch(scratch);
        }
    }

    if take {
        provider.drop(elem_used);
    }
    Ok(())
}

/// Whether the just-appended state makes a mid-loop
/// [`ResolveBehavior::Partial`]/[`PartialDefer`](ResolveBehavior::PartialDefer)
/// resolver succeed, short-circuiting the main loop.
fn trial_resolve_succeeds<T, O, R>(
    operator: &Operator<T, O>,
    pending: &Pending<T>,
    provider: &Provider<'_, T, R>,
    start: usize,
) -> bool
where
    T: Copy,
    R: Reader<T>,
{
    let min_len = match &operator.resolve {
        Some(Resolve::Slice { behavior, .. } | Resolve::Whole { behavior, .. }) => match behavior {
            ResolveBehavior::Partial => 0,
            ResolveBehavior::PartialDefer(n) => *n,
            _ => return false,
        },
        _ => return false,
    };

    let data = match pending {
        Pending::View { len } => provider.view_slice(start, *len),
        Pending::Scratch(scratch) => scratch.view(),
    };
    if data.len() < min_len {
        return false;
    }

    match &operator.resolve {
        Some(Resolve::Slice { func, .. }) => func(data).is_some(),
        Some(Resolve::Whole { func, .. }) => func(data).is_some(),
        _ => false,
    }
}

/// Materializes the final [`Ownership`] from `pending` and dispatches to the
/// [`Processor`] method matching the operator's resolver shape (or
/// [`Processor::consume_input`] for none/[`Resolve::PerElement`], whose
/// transformation already happened in [`push`]).
fn finalize<'p, T, O, R>(
    operator: &Operator<T, O>,
    pending: Pending<T>,
    provider: &'p Provider<'_, T, R>,
    start: usize,
    used: usize,
    force_clone: bool,
) -> Outcome<Evaluated<'p, T, O>>
where
    T: Copy,
    R: Reader<T>,
{
    let mode = if force_clone { Mode::Clone } else { Mode::Standard };
    let processor = Processor::new(mode);

    let ownership = match pending {
        Pending::View { len } => Ownership::View(provider.view_slice(start, len)),
        Pending::Scratch(scratch) => Ownership::Buffer(scratch.into_owned()),
    };

    let outcome = match &operator.resolve {
        None | Some(Resolve::PerElement { .. }) => processor.consume_input(ownership),
        Some(Resolve::Slice { behavior, func }) => {
            processor.consume_resolved_slice(ownership, *behavior, func.as_ref())
        }
        Some(Resolve::Whole { behavior, func }) => {
            processor.consume_resolved_value(ownership, *behavior, func.as_ref())
        }
    };

    match outcome {
        ConsumeOutcome::Value(value) => {
            let owned = value.is_owned();
            Outcome::Ok(EvalState { value, used, owned })
        }
        ConsumeOutcome::Discard => unreachable!("finalize is never invoked under Mode::Discard"),
        ConsumeOutcome::Fail => Outcome::Fail,
    }
}
