// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report generation module

pub mod formatter;
pub mod output;

use crate::logic::{Rule, RuleApplication, Saturation};
use crate::query::Query;
use crate::types::{FactSet, Term};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub use formatter::ReportFormatter;
pub use output::ReportOutputFormat;

/// Outcome of a `derive` run.
#[derive(Debug, Clone, Serialize)]
pub struct DeriveReport {
    pub generated_at: String,
    pub source: Option<String>,
    pub input_facts: usize,
    pub rules: Vec<String>,
    pub passes: usize,
    pub applications: Vec<RuleApplication>,
    pub derived: Vec<String>,
}

impl DeriveReport {
    pub fn new(
        source: Option<&Path>,
        facts: &FactSet,
        rules: &[Rule],
        saturation: &Saturation,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: source.map(|path| path.display().to_string()),
            input_facts: facts.len(),
            rules: rules
                .iter()
                .map(|rule| format!("{}: {}", rule.name, rule))
                .collect(),
            passes: saturation.passes,
            applications: saturation.applications.clone(),
            derived: saturation.derived.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Outcome of a `query` run.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub generated_at: String,
    pub select: Vec<String>,
    pub patterns: Vec<String>,
    pub closure_size: usize,
    pub rows: Vec<Vec<Term>>,
}

impl QueryReport {
    pub fn new(query: &Query, closure_size: usize, rows: Vec<Vec<Term>>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            select: query.select.iter().map(|name| format!("?{}", name)).collect(),
            patterns: query.patterns.iter().map(ToString::to_string).collect(),
            closure_size,
            rows,
        }
    }
}

/// Serializes `report` and writes it to `path`.
pub fn save_report<T: Serialize>(
    report: &T,
    format: ReportOutputFormat,
    path: &Path,
) -> Result<()> {
    let content = format.serialize(report)?;
    fs::write(path, content).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}
