// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rules: a conjunction of relation patterns implying one consequent.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::logic::canon::{self, CanonicalMapping, CanonicalRule, PatternShape};
use crate::logic::fixpoint::{self, FixpointOutcome};
use crate::types::{Axiom, FactSet};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// `body[0] ^ body[1] ^ ... -> head`
///
/// The body is never empty. A rule built with [`Rule::conjunction`] has no
/// head; it can be canonicalized but not asked for consequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: String,
    body: Vec<Axiom>,
    head: Option<Axiom>,
}

impl Rule {
    pub fn new(name: impl Into<String>, body: Vec<Axiom>, head: Axiom) -> Result<Self> {
        Self::build(name.into(), body, Some(head))
    }

    /// A head-less rule, used to canonicalize an ad hoc conjunction.
    pub fn conjunction(body: Vec<Axiom>) -> Result<Self> {
        Self::build("conjunction".to_string(), body, None)
    }

    fn build(name: String, body: Vec<Axiom>, head: Option<Axiom>) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::EmptyBody(name));
        }
        Ok(Self { name, body, head })
    }

    pub fn body(&self) -> &[Axiom] {
        &self.body
    }

    pub fn head(&self) -> Option<&Axiom> {
        self.head.as_ref()
    }

    /// Number of body atoms, i.e. the length of candidate tuples.
    pub fn arity(&self) -> usize {
        self.body.len()
    }

    pub fn canonicalize(&self) -> (CanonicalMapping, CanonicalRule) {
        canon::canonicalize(&self.body, self.head.as_ref())
    }

    pub fn shape(&self) -> PatternShape {
        canon::shape_of(&self.body)
    }

    /// Facts derivable from `facts` by repeated application of this rule,
    /// minus the facts that were already given.
    pub fn consequences(&self, facts: &FactSet) -> Result<FactSet> {
        self.consequences_with(facts, &EngineConfig::default())
            .map(|outcome| outcome.derived)
    }

    pub fn consequences_with(
        &self,
        facts: &FactSet,
        config: &EngineConfig,
    ) -> Result<FixpointOutcome> {
        fixpoint::run(self, facts, config)
    }
}

/// Builds an unnamed rule; its name is its display form.
pub fn make_rule(body: Vec<Axiom>, head: Axiom) -> Result<Rule> {
    let name = body
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ^ ");
    Rule::new(format!("{} -> {}", name, head), body, head)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.body.iter().enumerate() {
            if i > 0 {
                f.write_str(" ^ ")?;
            }
            write!(f, "{}", atom)?;
        }
        if let Some(head) = &self.head {
            write!(f, " -> {}", head)?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = Error;

    /// Parses `[name: ]b1 ^ b2 ^ ... -> head`. A name prefix must be followed
    /// by whitespace after its colon, so prefixed terms like `owl:Thing`
    /// are left alone.
    fn from_str(s: &str) -> Result<Self> {
        let (name, text) = split_name(s);
        let (body, head) = text
            .split_once("->")
            .ok_or_else(|| Error::parse(s, "missing '->'"))?;
        if head.contains("->") {
            return Err(Error::parse(s, "more than one '->'"));
        }
        let body = body
            .split('^')
            .filter(|atom| !atom.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Axiom>>>()?;
        let head: Axiom = head.parse()?;
        match name {
            Some(name) => Rule::new(name, body, head),
            None => make_rule(body, head),
        }
    }
}

fn split_name(s: &str) -> (Option<&str>, &str) {
    if let Some((name, rest)) = s.split_once(':') {
        let name = name.trim();
        let is_label = !name.is_empty()
            && !name.contains('(')
            && rest.starts_with(char::is_whitespace);
        if is_label {
            return (Some(name), rest);
        }
    }
    (None, s)
}
