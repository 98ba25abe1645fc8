#![allow(missing_docs)]

mod common;

use common::VecReader;
use opeval::{
    ConsumptionBehavior, Evaluated, FilterBehavior, FilterOperator, Match, Operator,
    OperatorBuilder, Outcome, Provider, Resolve, ResolveBehavior, SingleMatch,
};

fn byte_eq(target: u8) -> Operator<u8, u8> {
    OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(move |b: &u8| *b == target),
        capacity_hint: 1,
    }))
    .build()
}

fn accept_any() -> Operator<u8, u8> {
    OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|_: &u8| true),
        capacity_hint: 1,
    }))
    .build()
}

fn direct_provider(data: &[u8]) -> Provider<'_, u8, VecReader> {
    Provider::Direct(data)
}

#[test]
fn direct_view_matches_and_borrows() {
    let data = b"abc".to_vec();
    let mut provider = direct_provider(&data);
    let op = byte_eq(b'a');

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    let state = outcome.ok().expect("predicate should match");
    assert_eq!(state.used, 1);
    assert!(!state.owned);
    assert!(matches!(state.value, Evaluated::Item(b'a')));
}

#[test]
fn predicate_mismatch_fails() {
    let data = b"abc".to_vec();
    let mut provider = direct_provider(&data);
    let op = byte_eq(b'z');

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    assert!(outcome.is_fail());
}

#[test]
fn stream_take_advances_cursor_immediately() {
    let mut reader = VecReader::new(b"abc".to_vec());
    let mut provider = Provider::Stream(&mut reader);
    let op = byte_eq(b'a');

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap();
    let state = outcome.ok().expect("predicate should match");
    assert_eq!(provider.consumed_count(), state.used, "the evaluator drops the match itself");
    assert_eq!(provider.consumed_count(), 1);
}

#[test]
fn stream_take_three_calls_then_end_of_stream() {
    let mut reader = VecReader::new(b"ab".to_vec());
    let mut provider = Provider::Stream(&mut reader);
    let op = accept_any();

    let first = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap();
    let state = first.ok().expect("'a' should match");
    assert!(matches!(state.value, Evaluated::Item(b'a')));

    let second = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap();
    let state = second.ok().expect("'b' should match");
    assert!(matches!(state.value, Evaluated::Item(b'b')));

    let err = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap_err();
    assert!(matches!(err, opeval::ProviderError::EndOfStream));
}

#[test]
fn alignment_in_take_mode_drops_padding_and_advances_past_the_match() {
    let mut reader = VecReader::new(b"abcd".to_vec());
    let mut provider = Provider::Stream(&mut reader);
    provider.drop(1); // simulate starting at cursor 1

    let op = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|_: &u8| true),
        capacity_hint: 1,
    }))
    .alignment(2)
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap();
    let state = outcome.ok().expect("the padding plus the aligned byte should match");
    assert_eq!(state.used, 2, "one byte of padding plus the matched byte");
    assert!(matches!(state.value, Evaluated::Item(b'c')));
    assert_eq!(provider.consumed_count(), 3);
}

#[test]
fn filter_override_skips_the_outer_predicate() {
    let filter: FilterOperator<u8> = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|_: &u8| true),
        capacity_hint: 1,
    }))
    .resolve(Resolve::whole(ResolveBehavior::Fail, |_: &[u8]| Some(b'x')))
    .build();

    let data = b"abc".to_vec();
    let mut provider = direct_provider(&data);
    let op: Operator<u8, u8> = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|b: &u8| *b != b'a'), // rejects the raw byte outright
        capacity_hint: 1,
    }))
    .filter(filter, FilterBehavior::Override)
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    let state = outcome.ok().expect("the filter's substituted value bypasses the outer predicate");
    assert_eq!(state.used, 1);
    assert!(matches!(state.value, Evaluated::Item(b'x')));
}

#[test]
fn stream_drop_discards_and_advances_immediately() {
    let mut reader = VecReader::new(b"abc".to_vec());
    let mut provider = Provider::Stream(&mut reader);
    let op = byte_eq(b'a');

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamDrop).unwrap();
    assert!(outcome.is_discard());
    assert_eq!(provider.consumed_count(), 1);
}

#[test]
fn stream_take_fails_cleanly_at_end_of_stream() {
    let mut reader = VecReader::new(Vec::<u8>::new());
    let mut provider = Provider::Stream(&mut reader);
    let op = byte_eq(b'a');

    let err = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::StreamTake).unwrap_err();
    assert!(matches!(err, opeval::ProviderError::EndOfStream));
}

#[test]
fn direct_clone_always_allocates_even_for_a_scalar() {
    let data = b"a".to_vec();
    let mut provider = direct_provider(&data);
    let op = byte_eq(b'a');

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectClone).unwrap();
    let state = outcome.ok().unwrap();
    assert!(state.owned);
}

#[test]
fn alignment_padding_is_counted_into_used() {
    let data = vec![0u8, 0, 0, 0, b'a'];
    let mut provider = direct_provider(&data);
    let op = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|b: &u8| *b == b'a'),
        capacity_hint: 1,
    }))
    .alignment(4)
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 1, ConsumptionBehavior::DirectView).unwrap();
    let state = outcome.ok().expect("padded byte at offset 4 should match");
    assert_eq!(state.used, 4, "3 bytes of padding plus the matched byte");
    assert!(matches!(state.value, Evaluated::Item(b'a')));
}

#[test]
fn whole_resolver_safe_falls_back_on_rejection() {
    let data = b"x".to_vec();
    let mut provider = direct_provider(&data);
    let op = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|_: &u8| true),
        capacity_hint: 1,
    }))
    .resolve(Resolve::whole(ResolveBehavior::Safe, |s: &[u8]| {
        (s[0].is_ascii_digit()).then(|| u32::from(s[0] - b'0'))
    }))
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    let state = outcome.ok().expect("Safe falls back rather than failing");
    assert!(matches!(state.value, Evaluated::Item(b'x')));
}

#[test]
fn whole_resolver_fail_rejects_the_whole_operator() {
    let data = b"x".to_vec();
    let mut provider = direct_provider(&data);
    let op: Operator<u8, u32> = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|_: &u8| true),
        capacity_hint: 1,
    }))
    .resolve(Resolve::whole(ResolveBehavior::Fail, |s: &[u8]| {
        (s[0].is_ascii_digit()).then(|| u32::from(s[0] - b'0'))
    }))
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    assert!(outcome.is_fail());
}

#[test]
fn whole_resolver_produces_a_detached_value_on_success() {
    let data = b"7".to_vec();
    let mut provider = direct_provider(&data);
    let op: Operator<u8, u32> = OperatorBuilder::new(Match::Single(SingleMatch {
        predicate: Box::new(|b: &u8| b.is_ascii_digit()),
        capacity_hint: 1,
    }))
    .resolve(Resolve::whole(ResolveBehavior::Fail, |s: &[u8]| {
        Some(u32::from(s[0] - b'0'))
    }))
    .build();

    let outcome = opeval::dispatch(&op, &mut provider, 0, ConsumptionBehavior::DirectView).unwrap();
    let state = outcome.ok().unwrap();
    assert!(state.owned);
    assert!(matches!(state.value, Evaluated::Resolved(7)));
}
