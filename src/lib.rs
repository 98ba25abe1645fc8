//! A compile-time composable operator evaluation core for byte-stream
//! parser combinators.
//!
//! This crate specifies and implements the machinery that interprets a
//! composed [`Operator`](operator::Operator) — a matcher, an optional
//! pre-filter, an optional resolver, size hints, and alignment — against a
//! [`Provider`](provider::Provider) (a complete slice or a bounded streaming
//! reader) under one of six [`ConsumptionBehavior`](behavior::ConsumptionBehavior)
//! variants that determine viewing vs. taking, cloning vs. borrowing, and
//! drop-on-success semantics.
//!
//! The crate deliberately does not provide a user-facing decoder facade
//! (`skip`/`take`/`peek` wrappers) or a concrete operator library (character
//! classes, UTF-8 matchers, repetition combinators). Those are external
//! collaborators built on top of [`eval::dispatch`].

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod behavior;
pub mod error;
pub mod eval;
pub mod operator;
pub mod processor;
pub mod provider;
pub mod scratch;
pub mod state;

pub use behavior::ConsumptionBehavior;
pub use error::ProviderError;
pub use eval::dispatch;
pub use operator::{
    FilterBehavior, FilterOperator, Match, Operator, OperatorBuilder, Resolve, ResolveBehavior,
    ScratchHint, SequenceMatch, SingleMatch, Verdict,
};
pub use processor::{Evaluated, Ownership, Processor};
pub use provider::{Provider, Reader};
pub use scratch::Scratch;
pub use state::{EvalState, Outcome};
