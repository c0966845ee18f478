// SPDX-License-Identifier: PMPL-1.0-or-later

//! Joint saturation over several rules
//!
//! Each pass runs every rule to its own fixpoint over the facts known so
//! far; passes repeat until none of the rules adds anything.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::logic::fixpoint::{difference, union_dedup};
use crate::logic::rule::Rule;
use crate::types::FactSet;
use log::debug;
use serde::Serialize;

/// How much a rule contributed to a saturation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleApplication {
    pub name: String,
    pub derived: usize,
    /// Fixpoint rounds spent in this rule, summed over passes.
    pub rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Saturation {
    pub derived: FactSet,
    pub passes: usize,
    /// Rules that derived at least one fact, in rule order.
    pub applications: Vec<RuleApplication>,
}

#[derive(Debug, Clone, Default)]
pub struct Reasoner {
    rules: Vec<Rule>,
    config: EngineConfig,
}

impl Reasoner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    pub fn with_rules(rules: Vec<Rule>, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies all rules until no rule derives a new fact. `max_rounds`
    /// bounds the number of passes as well as each rule's own rounds.
    pub fn saturate(&self, facts: &FactSet) -> Result<Saturation> {
        let mut known = facts.clone();
        let mut tallies: Vec<RuleApplication> = self
            .rules
            .iter()
            .map(|rule| RuleApplication {
                name: rule.name.clone(),
                derived: 0,
                rounds: 0,
            })
            .collect();
        let mut passes = 0;

        loop {
            if let Some(limit) = self.config.max_rounds {
                if passes >= limit {
                    return Err(Error::RoundLimitExceeded {
                        limit,
                        partial: difference(&known, facts),
                    });
                }
            }
            passes += 1;

            let mut grew = false;
            for (rule, tally) in self.rules.iter().zip(tallies.iter_mut()) {
                let outcome = match rule.consequences_with(&known, &self.config) {
                    Ok(outcome) => outcome,
                    Err(Error::RoundLimitExceeded { limit, partial }) => {
                        return Err(Error::RoundLimitExceeded {
                            limit,
                            partial: union_dedup(&difference(&known, facts), &partial),
                        });
                    }
                    Err(err) => return Err(err),
                };
                tally.rounds += outcome.stats.rounds;
                if outcome.derived.is_empty() {
                    continue;
                }
                debug!(
                    "pass {}: rule '{}' derived {} facts",
                    passes,
                    rule.name,
                    outcome.derived.len()
                );
                grew = true;
                tally.derived += outcome.derived.len();
                known = union_dedup(&known, &outcome.derived);
            }

            if !grew {
                break;
            }
        }

        Ok(Saturation {
            derived: difference(&known, facts),
            passes,
            applications: tallies.into_iter().filter(|t| t.derived > 0).collect(),
        })
    }
}
