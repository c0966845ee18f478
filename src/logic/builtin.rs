// SPDX-License-Identifier: PMPL-1.0-or-later

//! Built-in ABox rules for class and property hierarchies.

use crate::error::Result;
use crate::logic::rule::Rule;

const DEFINITIONS: &[&str] = &[
    "subclass-transitivity: subClassOf(x,y) ^ subClassOf(y,z) -> subClassOf(x,z)",
    "subproperty-transitivity: subPropertyOf(p,q) ^ subPropertyOf(q,r) -> subPropertyOf(p,r)",
    "type-inheritance: type(i,c) ^ subClassOf(c,d) -> type(i,d)",
    "equivalence-symmetry: equivalentClass(x,y) -> equivalentClass(y,x)",
    "equivalence-subsumption: equivalentClass(x,y) -> subClassOf(x,y)",
    "inverse-symmetry: inverseOf(p,q) -> inverseOf(q,p)",
    "sameas-symmetry: sameAs(x,y) -> sameAs(y,x)",
    "sameas-transitivity: sameAs(x,y) ^ sameAs(y,z) -> sameAs(x,z)",
];

/// The built-in rule pack.
pub struct BuiltinRules;

impl BuiltinRules {
    pub fn all() -> Result<Vec<Rule>> {
        DEFINITIONS.iter().map(|text| text.parse()).collect()
    }

    pub fn find(name: &str) -> Result<Option<Rule>> {
        Ok(Self::all()?.into_iter().find(|rule| rule.name == name))
    }

    pub fn names() -> Result<Vec<String>> {
        Ok(Self::all()?.into_iter().map(|rule| rule.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::logic::reasoner::Reasoner;
    use crate::types::{make_fact, FactSet};

    #[test]
    fn test_all_definitions_parse() {
        let rules = BuiltinRules::all().unwrap();
        assert_eq!(rules.len(), DEFINITIONS.len());
        assert!(rules.iter().all(|rule| rule.head().is_some()));
    }

    #[test]
    fn test_find_by_name() {
        let rule = BuiltinRules::find("type-inheritance").unwrap().unwrap();
        assert_eq!(rule.arity(), 2);
        assert!(BuiltinRules::find("no-such-rule").unwrap().is_none());
    }

    #[test]
    fn test_equivalence_yields_mutual_subsumption() {
        let reasoner = Reasoner::with_rules(BuiltinRules::all().unwrap(), EngineConfig::default());
        let facts: FactSet = [make_fact("equivalentClass", "Human", "Person")]
            .into_iter()
            .collect();
        let saturation = reasoner.saturate(&facts).unwrap();
        assert!(saturation
            .derived
            .contains(&make_fact("subClassOf", "Human", "Person")));
        assert!(saturation
            .derived
            .contains(&make_fact("subClassOf", "Person", "Human")));
    }
}
