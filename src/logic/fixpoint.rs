// SPDX-License-Identifier: PMPL-1.0-or-later

//! Naive bottom-up fixpoint for a single rule
//!
//! Each round enumerates every ordered tuple of known facts with
//! repetition, one fact per body position, and keeps the tuples whose
//! canonical form fits the rule body. The head is instantiated for each
//! such tuple. Rounds repeat over the grown fact set until one adds nothing.
//!
//! A position is only ever offered facts with the relation name the body
//! expects there; every other tuple has a different pattern shape, so the
//! filtered enumeration sees exactly the matches of the full product.

use crate::config::{EngineConfig, MatchMode};
use crate::error::{Error, Result};
use crate::logic::canon::{CanonicalMapping, PatternShape};
use crate::logic::rule::Rule;
use crate::types::{Axiom, FactSet, PatternAtom};
use log::{debug, trace};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixpointStats {
    pub rounds: usize,
    pub tuples_examined: u64,
    pub matches: u64,
    /// Matches dropped because no consistent substitution exists.
    pub discarded: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixpointOutcome {
    /// Facts derived beyond the input set.
    pub derived: FactSet,
    pub stats: FixpointStats,
}

/// Deduplicated union of two fact collections.
pub fn union_dedup(left: &FactSet, right: &FactSet) -> FactSet {
    left.union(right).cloned().collect()
}

/// Facts of `left` that are absent from `right`.
pub fn difference(left: &FactSet, right: &FactSet) -> FactSet {
    left.difference(right).cloned().collect()
}

/// Runs `rule` to fixpoint over `facts`; see [`Rule::consequences_with`].
pub fn run(rule: &Rule, facts: &FactSet, config: &EngineConfig) -> Result<FixpointOutcome> {
    let (rule_map, canonical) = rule.canonicalize();
    let head = canonical
        .head
        .ok_or_else(|| Error::MissingHead(rule.name.clone()))?;
    let matcher = Matcher {
        shape: &canonical.body,
        head: &head,
        rule_map: &rule_map,
        mode: config.match_mode,
    };
    debug!("rule '{}' pattern: {} -> {}", rule.name, canonical.body, head);

    let mut known = facts.clone();
    let mut stats = FixpointStats::default();

    loop {
        if let Some(limit) = config.max_rounds {
            if stats.rounds >= limit {
                debug!("rule '{}' stopped at round limit {}", rule.name, limit);
                return Err(Error::RoundLimitExceeded {
                    limit,
                    partial: difference(&known, facts),
                });
            }
        }
        stats.rounds += 1;

        let candidates = candidates_by_position(matcher.shape, &known);
        let tuples = tuple_count(&candidates);
        let scan = if config.parallel && tuples >= config.parallel_threshold as u64 {
            candidates[0]
                .par_iter()
                .map(|lead| matcher.scan(&candidates, std::slice::from_ref(lead)))
                .reduce(RoundScan::default, RoundScan::merge)
        } else {
            matcher.scan(&candidates, &candidates[0])
        };

        stats.tuples_examined += scan.tuples;
        stats.matches += scan.matches;
        stats.discarded += scan.discarded;

        let fresh = difference(&scan.derived, &known);
        debug!(
            "rule '{}' round {}: {} tuples, {} matches, {} new facts",
            rule.name,
            stats.rounds,
            scan.tuples,
            scan.matches,
            fresh.len()
        );
        if fresh.is_empty() {
            break;
        }
        known = union_dedup(&known, &fresh);
    }

    Ok(FixpointOutcome {
        derived: difference(&known, facts),
        stats,
    })
}

/// For each body position, the known facts carrying that position's name.
fn candidates_by_position<'a>(shape: &PatternShape, known: &'a FactSet) -> Vec<Vec<&'a Axiom>> {
    shape
        .atoms()
        .iter()
        .map(|atom| known.iter().filter(|fact| fact.name == atom.name).collect())
        .collect()
}

fn tuple_count(candidates: &[Vec<&Axiom>]) -> u64 {
    candidates
        .iter()
        .fold(1u64, |acc, list| acc.saturating_mul(list.len() as u64))
}

/// Steps `cursor` to the next tuple, last position fastest. Returns false
/// once every combination has been visited.
fn advance(cursor: &mut [usize], lists: &[Vec<&Axiom>]) -> bool {
    for (slot, list) in cursor.iter_mut().zip(lists).rev() {
        *slot += 1;
        if *slot < list.len() {
            return true;
        }
        *slot = 0;
    }
    false
}

#[derive(Debug, Default)]
struct RoundScan {
    derived: FactSet,
    tuples: u64,
    matches: u64,
    discarded: u64,
}

impl RoundScan {
    fn merge(mut self, other: RoundScan) -> RoundScan {
        self.derived.extend(other.derived);
        self.tuples += other.tuples;
        self.matches += other.matches;
        self.discarded += other.discarded;
        self
    }
}

struct Matcher<'r> {
    shape: &'r PatternShape,
    head: &'r PatternAtom,
    rule_map: &'r CanonicalMapping,
    mode: MatchMode,
}

impl Matcher<'_> {
    /// Examines every tuple whose first fact is drawn from `leads` and whose
    /// other facts come from the matching `candidates` lists.
    fn scan(&self, candidates: &[Vec<&Axiom>], leads: &[&Axiom]) -> RoundScan {
        let mut scan = RoundScan::default();
        let rest = &candidates[1..];
        if rest.iter().any(Vec::is_empty) {
            return scan;
        }

        let mut tuple: Vec<&Axiom> = Vec::with_capacity(candidates.len());
        for &lead in leads {
            let mut cursor = vec![0usize; rest.len()];
            loop {
                tuple.clear();
                tuple.push(lead);
                tuple.extend(cursor.iter().zip(rest).map(|(&i, list)| list[i]));
                scan.tuples += 1;
                self.examine(&tuple, &mut scan);
                if !advance(&mut cursor, rest) {
                    break;
                }
            }
        }
        scan
    }

    fn examine(&self, tuple: &[&Axiom], scan: &mut RoundScan) {
        let substitution = match self.mode {
            MatchMode::Exact => match self.shape.match_tuple(tuple) {
                Some(mapping) => mapping.complete(self.rule_map),
                None => return,
            },
            MatchMode::Specializing => match self.shape.specialize(tuple) {
                Some(bound) => bound.complete_with(self.rule_map, false),
                None => return,
            },
        };
        scan.matches += 1;

        let derived = substitution
            .map_err(|err| trace!("discarding match: {}", err))
            .ok()
            .and_then(|substitution| self.head.reattribute(&substitution));
        match derived {
            Some(fact) => {
                trace!("{} => {}", display_tuple(tuple), fact);
                scan.derived.insert(fact);
            }
            None => scan.discarded += 1,
        }
    }
}

fn display_tuple(tuple: &[&Axiom]) -> String {
    tuple
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ^ ")
}
