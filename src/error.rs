// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for rule construction and closure computation.

use crate::types::FactSet;
use thiserror::Error;

/// A specialized `Result` type for reasoner operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A rule needs at least one body atom.
    #[error("rule '{0}' has an empty body")]
    EmptyBody(String),

    /// `consequences` was called on a head-less conjunction.
    #[error("rule '{0}' has no head and cannot derive consequences")]
    MissingHead(String),

    /// The tuple mapping and the rule mapping disagree about a term.
    #[error("cannot compose substitution: term '{term}' bound to {tuple_index} by the match but to {rule_index} by the rule")]
    CompositionInconsistency {
        term: String,
        tuple_index: usize,
        rule_index: usize,
    },

    /// The fixpoint did not settle within the configured number of rounds.
    /// `partial` holds everything derived before the limit was hit.
    #[error("no fixpoint after {limit} rounds ({} facts derived so far)", partial.len())]
    RoundLimitExceeded { limit: usize, partial: FactSet },

    /// A query must contain at least one pattern.
    #[error("query has no patterns")]
    EmptyQuery,

    /// Text that does not follow the `name(left,right)` / `body -> head` forms.
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },
}

impl Error {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
