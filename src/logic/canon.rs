// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pattern canonicalization
//!
//! A conjunction is canonicalized by renaming every term to the index of
//! its first appearance (body in order, then the head). Two conjunctions
//! with equal canonical shapes are identical up to a renaming of terms
//! that keeps relation names and term sharing per position.

use crate::error::{Error, Result};
use crate::types::{Axiom, PatternAtom, Term};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Term to first-appearance index. Injective by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalMapping {
    order: Vec<Term>,
    #[serde(skip)]
    indices: HashMap<Term, usize>,
}

impl CanonicalMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `term`, assigning the next free one if it is unseen.
    pub fn index_of(&mut self, term: &Term) -> usize {
        if let Some(&index) = self.indices.get(term) {
            return index;
        }
        let index = self.order.len();
        self.indices.insert(term.clone(), index);
        self.order.push(term.clone());
        index
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.indices.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(index, term)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Term)> {
        self.order.iter().enumerate()
    }

    /// The plain inverse of this mapping.
    pub fn to_substitution(&self) -> Substitution {
        Substitution {
            terms: self.order.iter().cloned().enumerate().collect(),
        }
    }

    /// Composes this mapping, taken from a matched tuple, with the rule's own
    /// mapping into a substitution from rule indices to concrete terms.
    ///
    /// Indices the tuple binds take the tuple's terms. Indices only the rule
    /// knows (terms that occur in the head alone) keep the rule's term. A
    /// head-only term that the tuple already binds under another index would
    /// make the substitution non-injective, and is rejected.
    pub fn complete(&self, rule: &CanonicalMapping) -> Result<Substitution> {
        self.to_substitution().complete_with(rule, true)
    }
}

/// Canonical index to concrete term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Substitution {
    terms: BTreeMap<usize, Term>,
}

impl Substitution {
    /// Fills every index this substitution leaves unbound with the rule's
    /// own term for it.
    ///
    /// With `injective` set, a rule term that is already the image of some
    /// other index fails with `Error::CompositionInconsistency`.
    pub fn complete_with(mut self, rule: &CanonicalMapping, injective: bool) -> Result<Self> {
        for (rule_index, term) in rule.iter() {
            if self.terms.contains_key(&rule_index) {
                continue;
            }
            if injective {
                if let Some(tuple_index) = self.index_of(term) {
                    return Err(Error::CompositionInconsistency {
                        term: term.clone(),
                        tuple_index,
                        rule_index,
                    });
                }
            }
            self.terms.insert(rule_index, term.clone());
        }
        Ok(self)
    }

    fn index_of(&self, term: &str) -> Option<usize> {
        self.terms
            .iter()
            .find(|(_, bound)| bound.as_str() == term)
            .map(|(&index, _)| index)
    }

    pub fn term_for(&self, index: usize) -> Option<&str> {
        self.terms.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The canonicalized body of a conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatternShape(pub Vec<PatternAtom>);

impl PatternShape {
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn atoms(&self) -> &[PatternAtom] {
        &self.0
    }

    /// Canonicalizes `tuple` position by position and compares it with this
    /// shape, stopping at the first position that differs.
    ///
    /// Gives the same answer as canonicalizing the whole tuple and comparing
    /// shapes; on a match the tuple's own mapping is returned.
    pub fn match_tuple(&self, tuple: &[&Axiom]) -> Option<CanonicalMapping> {
        if tuple.len() != self.0.len() {
            return None;
        }
        let mut mapping = CanonicalMapping::new();
        for (expected, fact) in self.0.iter().zip(tuple) {
            if expected.name != fact.name || fact.canonicalize(&mut mapping) != *expected {
                return None;
            }
        }
        Some(mapping)
    }

    /// Binds each index of this shape to the term found at the same place in
    /// `tuple`. Distinct indices may bind the same term, so `r(a,a)` fills
    /// `r(0,1)` with `0 = 1 = a`; a single index never binds two terms.
    pub fn specialize(&self, tuple: &[&Axiom]) -> Option<Substitution> {
        if tuple.len() != self.0.len() {
            return None;
        }
        let mut terms = BTreeMap::new();
        for (expected, fact) in self.0.iter().zip(tuple) {
            if expected.name != fact.name {
                return None;
            }
            for (index, term) in [(expected.left, &fact.left), (expected.right, &fact.right)] {
                match terms.entry(index) {
                    Entry::Occupied(bound) => {
                        if bound.get() != term {
                            return None;
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(term.clone());
                    }
                }
            }
        }
        Some(Substitution { terms })
    }
}

impl fmt::Display for PatternShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ^ ")?;
            }
            write!(f, "{}", atom)?;
        }
        Ok(())
    }
}

/// A rule with every term replaced by its canonical index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRule {
    pub body: PatternShape,
    pub head: Option<PatternAtom>,
}

impl fmt::Display for CanonicalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)?;
        if let Some(head) = &self.head {
            write!(f, " -> {}", head)?;
        }
        Ok(())
    }
}

/// Canonicalizes `body` and then `head` into one shared mapping.
pub fn canonicalize(body: &[Axiom], head: Option<&Axiom>) -> (CanonicalMapping, CanonicalRule) {
    let mut mapping = CanonicalMapping::new();
    let body = PatternShape(body.iter().map(|a| a.canonicalize(&mut mapping)).collect());
    let head = head.map(|h| h.canonicalize(&mut mapping));
    (mapping, CanonicalRule { body, head })
}

/// Shape of a stand-alone conjunction.
pub fn shape_of(conjunction: &[Axiom]) -> PatternShape {
    canonicalize(conjunction, None).1.body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::make_fact;

    fn uncle_rule() -> (Vec<Axiom>, Axiom) {
        (
            vec![
                make_fact("hasChild", "#Dad", "#Kid"),
                make_fact("hasBrother", "#Dad", "#Uncle"),
            ],
            make_fact("hasUncle", "#Kid", "#Uncle"),
        )
    }

    #[test]
    fn test_canonicalize_first_appearance() {
        let (body, head) = uncle_rule();
        let (mapping, rule) = canonicalize(&body, Some(&head));
        assert_eq!(
            rule.to_string(),
            "hasChild(0,1) ^ hasBrother(0,2) -> hasUncle(1,2)"
        );
        assert_eq!(mapping.get("#Dad"), Some(0));
        assert_eq!(mapping.get("#Kid"), Some(1));
        assert_eq!(mapping.get("#Uncle"), Some(2));
    }

    #[test]
    fn test_head_only_terms_are_numbered_after_body() {
        let body = vec![make_fact("type", "x", "Person")];
        let head = make_fact("type", "x", "Agent");
        let (mapping, rule) = canonicalize(&body, Some(&head));
        assert_eq!(rule.to_string(), "type(0,1) -> type(0,2)");
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_match_tuple_agrees_with_full_canonicalization() {
        let pattern = shape_of(&[make_fact("r", "x", "y"), make_fact("r", "y", "z")]);
        let chained = [make_fact("r", "a", "b"), make_fact("r", "b", "c")];
        let broken = [make_fact("r", "a", "b"), make_fact("r", "c", "d")];

        let refs: Vec<&Axiom> = chained.iter().collect();
        assert!(pattern.match_tuple(&refs).is_some());
        assert_eq!(shape_of(&chained), pattern);

        let refs: Vec<&Axiom> = broken.iter().collect();
        assert!(pattern.match_tuple(&refs).is_none());
        assert_ne!(shape_of(&broken), pattern);
    }

    #[test]
    fn test_match_tuple_checks_arity() {
        let pattern = shape_of(&[make_fact("r", "x", "y")]);
        let fact = make_fact("r", "a", "b");
        assert!(pattern.match_tuple(&[&fact, &fact]).is_none());
    }

    #[test]
    fn test_specialize_allows_shared_terms() {
        let pattern = shape_of(&[make_fact("r", "x", "y"), make_fact("r", "y", "z")]);
        let reflexive = make_fact("r", "a", "a");

        assert!(pattern.match_tuple(&[&reflexive, &reflexive]).is_none());
        let substitution = pattern.specialize(&[&reflexive, &reflexive]).unwrap();
        assert_eq!(substitution.term_for(0), Some("a"));
        assert_eq!(substitution.term_for(2), Some("a"));
    }

    #[test]
    fn test_specialize_rejects_conflicting_binding() {
        let pattern = shape_of(&[make_fact("r", "x", "y"), make_fact("r", "y", "z")]);
        let first = make_fact("r", "a", "b");
        let second = make_fact("r", "c", "d");
        assert!(pattern.specialize(&[&first, &second]).is_none());
        assert!(pattern.specialize(&[&second, &first]).is_none());
    }

    #[test]
    fn test_complete_keeps_tuple_bindings() {
        let (body, head) = uncle_rule();
        let (rule_map, _) = canonicalize(&body, Some(&head));

        let mut tuple_map = CanonicalMapping::new();
        make_fact("hasChild", "bob", "ann").canonicalize(&mut tuple_map);
        make_fact("hasBrother", "bob", "tom").canonicalize(&mut tuple_map);

        let substitution = tuple_map.complete(&rule_map).unwrap();
        assert_eq!(substitution.term_for(1), Some("ann"));
        assert_eq!(substitution.term_for(2), Some("tom"));
        assert_eq!(substitution.len(), 3);
    }

    #[test]
    fn test_complete_adds_head_only_terms() {
        let body = vec![make_fact("type", "x", "Person")];
        let head = make_fact("type", "x", "Agent");
        let (rule_map, _) = canonicalize(&body, Some(&head));

        let mut tuple_map = CanonicalMapping::new();
        make_fact("type", "alice", "Student").canonicalize(&mut tuple_map);

        let substitution = tuple_map.complete(&rule_map).unwrap();
        assert_eq!(substitution.term_for(0), Some("alice"));
        assert_eq!(substitution.term_for(2), Some("Agent"));
    }

    #[test]
    fn test_complete_rejects_inconsistent_composition() {
        let body = vec![make_fact("type", "x", "Person")];
        let head = make_fact("type", "x", "Agent");
        let (rule_map, _) = canonicalize(&body, Some(&head));

        let mut tuple_map = CanonicalMapping::new();
        make_fact("type", "Agent", "Role").canonicalize(&mut tuple_map);

        assert_eq!(
            tuple_map.complete(&rule_map),
            Err(Error::CompositionInconsistency {
                term: "Agent".to_string(),
                tuple_index: 0,
                rule_index: 2,
            })
        );
    }
}
