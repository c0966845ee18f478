// SPDX-License-Identifier: PMPL-1.0-or-later

//! Data-driven knowledge base loader
//!
//! A knowledge base file lists ground facts and rules in their display
//! forms, plus optional engine settings:
//!
//! ```yaml
//! facts:
//!   - subClassOf(Dog,Mammal)
//!   - type(rex,Dog)
//! rules:
//!   - "inherit: type(i,c) ^ subClassOf(c,d) -> type(i,d)"
//!   - name: transitivity
//!     rule: subClassOf(x,y) ^ subClassOf(y,z) -> subClassOf(x,z)
//! engine:
//!   max_rounds: 50
//! ```

use crate::config::EngineConfig;
use crate::logic::{BuiltinRules, Reasoner, Rule};
use crate::types::{Axiom, FactSet};
use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Text(String),
    Named { name: String, rule: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeBaseSpec {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub engine: Option<EngineConfig>,
}

impl RuleSpec {
    pub fn to_rule(&self) -> Result<Rule> {
        match self {
            RuleSpec::Text(text) => text
                .parse()
                .with_context(|| format!("parsing rule '{}'", text)),
            RuleSpec::Named { name, rule } => {
                let parsed: Rule = rule
                    .parse()
                    .with_context(|| format!("parsing rule '{}'", name))?;
                let head = parsed
                    .head()
                    .cloned()
                    .ok_or_else(|| anyhow!("rule '{}' has no head", name))?;
                Ok(Rule::new(name.clone(), parsed.body().to_vec(), head)?)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub facts: FactSet,
    pub rules: Vec<Rule>,
    pub engine: EngineConfig,
}

impl KnowledgeBase {
    pub fn load(path: &Path) -> Result<Self> {
        let spec: KnowledgeBaseSpec = read_structured(path, "knowledge base")?;
        Self::from_spec(spec).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_spec(spec: KnowledgeBaseSpec) -> Result<Self> {
        let facts = spec
            .facts
            .iter()
            .map(|text| {
                text.parse::<Axiom>()
                    .with_context(|| format!("parsing fact '{}'", text))
            })
            .collect::<Result<FactSet>>()?;
        let rules = spec
            .rules
            .iter()
            .map(RuleSpec::to_rule)
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                bail!("duplicate rule name '{}'", rule.name);
            }
        }

        Ok(Self {
            facts,
            rules,
            engine: spec.engine.unwrap_or_default(),
        })
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Appends the built-in pack, skipping names the file already defines.
    pub fn include_builtin(&mut self) -> Result<()> {
        for rule in BuiltinRules::all()? {
            if self.rule(&rule.name).is_none() {
                self.rules.push(rule);
            }
        }
        Ok(())
    }

    /// A reasoner over this knowledge base's rules.
    pub fn reasoner(&self, config: EngineConfig) -> Reasoner {
        Reasoner::with_rules(self.rules.clone(), config)
    }
}

/// Reads a JSON or YAML document, chosen by file extension.
pub fn read_structured<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {} {}", what, path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("parsing json {} {}", what, path.display())),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("parsing yaml {} {}", what, path.display())),
        _ => Err(anyhow!(
            "unsupported {} extension for {}",
            what,
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::make_fact;

    #[test]
    fn test_from_spec() {
        let spec = KnowledgeBaseSpec {
            facts: vec!["subClassOf(A,B)".into(), "subClassOf(B,C)".into()],
            rules: vec![RuleSpec::Named {
                name: "transitivity".into(),
                rule: "subClassOf(x,y) ^ subClassOf(y,z) -> subClassOf(x,z)".into(),
            }],
            engine: None,
        };
        let kb = KnowledgeBase::from_spec(spec).unwrap();
        assert_eq!(kb.facts.len(), 2);
        let rule = kb.rule("transitivity").unwrap();
        assert_eq!(
            rule.consequences(&kb.facts).unwrap(),
            [make_fact("subClassOf", "A", "C")].into_iter().collect()
        );
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let spec = KnowledgeBaseSpec {
            facts: vec![],
            rules: vec![
                RuleSpec::Text("r: a(x,y) -> b(x,y)".into()),
                RuleSpec::Text("r: b(x,y) -> c(x,y)".into()),
            ],
            engine: None,
        };
        let err = KnowledgeBase::from_spec(spec).unwrap_err();
        assert!(err.to_string().contains("duplicate rule name"));
    }

    #[test]
    fn test_bad_fact_reports_context() {
        let spec = KnowledgeBaseSpec {
            facts: vec!["oops".into()],
            ..Default::default()
        };
        let err = KnowledgeBase::from_spec(spec).unwrap_err();
        assert!(err.to_string().contains("parsing fact 'oops'"));
    }

    #[test]
    fn test_include_builtin_keeps_local_definitions() {
        let spec = KnowledgeBaseSpec {
            rules: vec![RuleSpec::Text(
                "subclass-transitivity: subClassOf(x,y) -> sub(x,y)".into(),
            )],
            ..Default::default()
        };
        let mut kb = KnowledgeBase::from_spec(spec).unwrap();
        kb.include_builtin().unwrap();
        let local = kb.rule("subclass-transitivity").unwrap();
        assert_eq!(local.arity(), 1);
        assert_eq!(kb.rules.len(), BuiltinRules::all().unwrap().len());
    }
}
