// SPDX-License-Identifier: PMPL-1.0-or-later

//! ABox Reasoner: forward-chaining closure over binary-relation facts.
//!
//! Facts and rule patterns share one value type, `name(left,right)`. A rule
//! is a conjunction of patterns implying a single consequent; its
//! consequences over a fact set are computed by a naive bottom-up fixpoint
//! that compares candidate tuples with the rule body after renaming terms
//! to first-appearance indices.
//!
//! PILLARS:
//! 1. **Logic**: canonicalization, rules, the fixpoint and multi-rule
//!    saturation.
//! 2. **Catalog**: knowledge base files (facts, rules, engine settings).
//! 3. **Query**: structured conjunctive queries over the closure.
//! 4. **Report**: coloured console output and JSON/YAML export.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logic;
pub mod query;
pub mod report;
pub mod types;

pub use config::{EngineConfig, MatchMode};
pub use error::{Error, Result};
pub use logic::{make_rule, Reasoner, Rule};
pub use types::{make_fact, Axiom, FactSet, PatternAtom, Relation, Term};
