// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core value types: relation values over named binary relations.
//!
//! A relation value `name(left,right)` is used both for ground ABox facts
//! and for rule patterns. The model does not tell constants and variables
//! apart; which one a term is depends only on where the value is used.

use crate::error::{Error, Result};
use crate::logic::canon::{CanonicalMapping, Substitution};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// An opaque individual or pattern variable.
pub type Term = String;

/// A binary relation applied to two terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation<T> {
    pub name: String,
    pub left: T,
    pub right: T,
}

/// A fact or pattern over concrete terms.
pub type Axiom = Relation<Term>;

/// A relation value whose terms have been replaced by canonical indices.
pub type PatternAtom = Relation<usize>;

/// Ordered, deduplicated fact collection.
pub type FactSet = BTreeSet<Axiom>;

impl<T> Relation<T> {
    pub fn new(name: impl Into<String>, left: T, right: T) -> Self {
        Self {
            name: name.into(),
            left,
            right,
        }
    }
}

/// Builds a relation value from its three components.
pub fn make_fact(name: &str, left: &str, right: &str) -> Axiom {
    Relation::new(name, left.to_string(), right.to_string())
}

impl Axiom {
    /// Replaces both terms by their first-appearance index, registering
    /// unseen terms in `mapping` (left before right).
    pub fn canonicalize(&self, mapping: &mut CanonicalMapping) -> PatternAtom {
        let left = mapping.index_of(&self.left);
        let right = mapping.index_of(&self.right);
        Relation::new(self.name.clone(), left, right)
    }

    /// Every distinct term of this value, left first.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        let right = (self.right != self.left).then_some(&self.right);
        std::iter::once(&self.left).chain(right)
    }
}

impl PatternAtom {
    /// Maps canonical indices back to concrete terms.
    ///
    /// Returns `None` when either index has no preimage in `substitution`.
    pub fn reattribute(&self, substitution: &Substitution) -> Option<Axiom> {
        let left = substitution.term_for(self.left)?;
        let right = substitution.term_for(self.right)?;
        Some(Relation::new(
            self.name.clone(),
            left.to_string(),
            right.to_string(),
        ))
    }
}

impl<T: fmt::Display> fmt::Display for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.name, self.left, self.right)
    }
}

fn atom_regex() -> &'static Regex {
    static ATOM: OnceLock<Regex> = OnceLock::new();
    ATOM.get_or_init(|| {
        Regex::new(r"^\s*([^\s(),^]+)\s*\(\s*([^\s(),^]+)\s*,\s*([^\s(),^]+)\s*\)\s*$")
            .expect("atom pattern is valid")
    })
}

impl FromStr for Axiom {
    type Err = Error;

    /// Parses the display form `name(left,right)`. Names and terms may not
    /// contain `^` or `->`, which separate atoms in rule text.
    fn from_str(s: &str) -> Result<Self> {
        let caps = atom_regex()
            .captures(s)
            .ok_or_else(|| Error::parse(s, "expected name(left,right)"))?;
        if caps[0].contains("->") {
            return Err(Error::parse(s, "'->' is not allowed inside an atom"));
        }
        Ok(Relation::new(&caps[1], caps[2].to_string(), caps[3].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_form() {
        let fact = make_fact("subClassOf", "A", "B");
        assert_eq!(fact.to_string(), "subClassOf(A,B)");
        assert_eq!(Relation::new("r", 0usize, 1usize).to_string(), "r(0,1)");
    }

    #[test]
    fn test_parse_round_trips_display() {
        let fact: Axiom = " hasChild ( #Dad , #Kid ) ".parse().unwrap();
        assert_eq!(fact, make_fact("hasChild", "#Dad", "#Kid"));
        assert_eq!(fact.to_string().parse::<Axiom>().unwrap(), fact);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("subClassOf(A)".parse::<Axiom>().is_err());
        assert!("subClassOf A B".parse::<Axiom>().is_err());
        assert!("(A,B)".parse::<Axiom>().is_err());
    }

    #[test]
    fn test_parse_rejects_rule_separators() {
        assert!("r(a^b,c)".parse::<Axiom>().is_err());
        assert!("r(a->b,c)".parse::<Axiom>().is_err());
        assert!("r->s(a,b)".parse::<Axiom>().is_err());
    }

    #[test]
    fn test_parsed_fact_fits_in_rule_text() {
        let fact: Axiom = "rdf:type(a-b,c>d)".parse().unwrap();
        let rule: crate::logic::Rule = format!("{} -> s(x,y)", fact).parse().unwrap();
        assert_eq!(rule.body(), &[fact]);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(make_fact("r", "a", "b"), make_fact("r", "a", "b"));
        assert_ne!(make_fact("r", "a", "b"), make_fact("r", "b", "a"));
        assert_ne!(make_fact("r", "a", "b"), make_fact("s", "a", "b"));
    }

    #[test]
    fn test_canonicalize_extends_mapping() {
        let mut mapping = CanonicalMapping::new();
        let first = make_fact("hasChild", "#Dad", "#Kid").canonicalize(&mut mapping);
        let second = make_fact("hasBrother", "#Dad", "#Uncle").canonicalize(&mut mapping);
        assert_eq!(first, Relation::new("hasChild", 0, 1));
        assert_eq!(second, Relation::new("hasBrother", 0, 2));
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_reflexive_fact_uses_one_index() {
        let mut mapping = CanonicalMapping::new();
        let atom = make_fact("r", "a", "a").canonicalize(&mut mapping);
        assert_eq!(atom, Relation::new("r", 0, 0));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_reattribute_inverse_lookup() {
        let mut mapping = CanonicalMapping::new();
        make_fact("r", "x", "y").canonicalize(&mut mapping);
        let substitution = mapping.to_substitution();

        let head = Relation::new("s", 1usize, 0usize);
        assert_eq!(
            head.reattribute(&substitution),
            Some(make_fact("s", "y", "x"))
        );

        let dangling = Relation::new("s", 0usize, 7usize);
        assert_eq!(dangling.reattribute(&substitution), None);
    }
}
