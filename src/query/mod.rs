// SPDX-License-Identifier: PMPL-1.0-or-later

//! Structured queries over a fact store
//!
//! A query is a conjunction of relation patterns whose terms are either
//! constants or `?variables`, together with the variables to project.
//! Evaluation is a left-to-right join over the store's per-relation index.

use crate::catalog::read_structured;
use crate::error::{Error, Result};
use crate::types::{Axiom, FactSet, Relation, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QueryTerm {
    Var(String),
    Const(Term),
}

impl QueryTerm {
    fn from_text(text: &str) -> Self {
        match text.strip_prefix('?') {
            Some(name) => QueryTerm::Var(name.to_string()),
            None => QueryTerm::Const(text.to_string()),
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTerm::Var(name) => write!(f, "?{}", name),
            QueryTerm::Const(term) => f.write_str(term),
        }
    }
}

pub type QueryPattern = Relation<QueryTerm>;

#[derive(Debug, Deserialize)]
struct QuerySpec {
    #[serde(default)]
    select: Vec<String>,
    #[serde(rename = "where")]
    patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub select: Vec<String>,
    pub patterns: Vec<QueryPattern>,
}

impl Query {
    /// Every selected variable must occur in some pattern; variable names
    /// may be given with or without the leading `?`.
    pub fn new(select: Vec<String>, patterns: Vec<QueryPattern>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let select: Vec<String> = select
            .into_iter()
            .map(|name| name.trim_start_matches('?').to_string())
            .collect();
        for name in &select {
            let bound = patterns.iter().any(|p| {
                [&p.left, &p.right]
                    .iter()
                    .any(|term| matches!(term, QueryTerm::Var(v) if v == name))
            });
            if !bound {
                return Err(Error::parse(
                    name,
                    "selected variable does not occur in the query",
                ));
            }
        }
        Ok(Self { select, patterns })
    }

    /// Parses `name(left,right)` where either term may be a `?variable`.
    pub fn pattern(text: &str) -> Result<QueryPattern> {
        let atom: Axiom = text.parse()?;
        Ok(Relation::new(
            atom.name,
            QueryTerm::from_text(&atom.left),
            QueryTerm::from_text(&atom.right),
        ))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let spec: QuerySpec = read_structured(path, "query")?;
        let patterns = spec
            .patterns
            .iter()
            .map(|text| Self::pattern(text))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(spec.select, patterns)?)
    }
}

/// Facts indexed by relation name.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: FactSet,
    by_relation: HashMap<String, Vec<Axiom>>,
}

impl FactStore {
    pub fn new(facts: FactSet) -> Self {
        let mut store = Self::default();
        store.extend(facts);
        store
    }

    pub fn extend(&mut self, facts: impl IntoIterator<Item = Axiom>) {
        for fact in facts {
            if self.facts.insert(fact.clone()) {
                self.by_relation
                    .entry(fact.name.clone())
                    .or_default()
                    .push(fact);
            }
        }
    }

    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    pub fn relation(&self, name: &str) -> &[Axiom] {
        self.by_relation.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Every term appearing in any fact.
    pub fn individuals(&self) -> BTreeSet<&Term> {
        self.facts.iter().flat_map(Axiom::terms).collect()
    }
}

type Bindings = HashMap<String, Term>;

/// Answers queries against a borrowed store.
pub struct QueryEvaluator<'s> {
    store: &'s FactStore,
}

impl<'s> QueryEvaluator<'s> {
    pub fn new(store: &'s FactStore) -> Self {
        Self { store }
    }

    /// Distinct rows of selected values, sorted. A query that selects
    /// nothing yields one empty row when it is satisfiable.
    pub fn answer(&self, query: &Query) -> Vec<Vec<Term>> {
        let mut current = vec![Bindings::new()];

        for pattern in &query.patterns {
            let mut next = Vec::new();
            for bindings in &current {
                for fact in self.store.relation(&pattern.name) {
                    if let Some(extended) = bind_pattern(pattern, fact, bindings) {
                        next.push(extended);
                    }
                }
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }

        let rows: BTreeSet<Vec<Term>> = current
            .iter()
            .map(|bindings| {
                query
                    .select
                    .iter()
                    .filter_map(|name| bindings.get(name).cloned())
                    .collect()
            })
            .collect();
        rows.into_iter().collect()
    }
}

fn bind_pattern(pattern: &QueryPattern, fact: &Axiom, bindings: &Bindings) -> Option<Bindings> {
    let mut extended = bindings.clone();
    for (term, value) in [(&pattern.left, &fact.left), (&pattern.right, &fact.right)] {
        match term {
            QueryTerm::Const(constant) => {
                if constant != value {
                    return None;
                }
            }
            QueryTerm::Var(name) => match extended.get(name) {
                Some(bound) if bound != value => return None,
                Some(_) => {}
                None => {
                    extended.insert(name.clone(), value.clone());
                }
            },
        }
    }
    Some(extended)
}
