// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rule representation and forward-chaining closure
//!
//! Provides:
//! - **Canonicalization** of conjunctions up to renaming of terms
//! - **Rules** with a non-empty body and an optional head
//! - **Fixpoint** computation of a single rule's consequences
//! - **Saturation** over a set of rules, with a built-in ontology pack

pub mod builtin;
pub mod canon;
pub mod fixpoint;
pub mod reasoner;
pub mod rule;

pub use builtin::BuiltinRules;
pub use canon::{
    canonicalize, shape_of, CanonicalMapping, CanonicalRule, PatternShape, Substitution,
};
pub use fixpoint::{difference, union_dedup, FixpointOutcome, FixpointStats};
pub use reasoner::{Reasoner, RuleApplication, Saturation};
pub use rule::{make_rule, Rule};
