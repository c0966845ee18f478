// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report formatting and output

use crate::logic::Rule;
use crate::report::{DeriveReport, QueryReport};
use colored::*;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_derive(&self, report: &DeriveReport) {
        println!("\n{}", "=== ABOX CLOSURE ===".bold().cyan());
        if let Some(source) = &report.source {
            println!("  Source: {}", source);
        }
        println!("  Input facts: {}", report.input_facts);
        println!("  Rules: {}", report.rules.len());
        for rule in &report.rules {
            println!("    - {}", rule.dimmed());
        }
        println!("  Passes: {}", report.passes);
        println!();

        if report.applications.is_empty() {
            println!("{}", "No rule fired".yellow());
        } else {
            println!("{}", "RULE APPLICATIONS".bold().yellow());
            for app in &report.applications {
                println!(
                    "  {} derived {} ({} rounds)",
                    app.name.bold(),
                    app.derived.to_string().green(),
                    app.rounds
                );
            }
        }
        println!();

        if report.derived.is_empty() {
            println!("{}", "No new facts derived".green());
        } else {
            println!(
                "{} {}",
                "DERIVED FACTS".bold().yellow(),
                format!("({})", report.derived.len()).dimmed()
            );
            for fact in &report.derived {
                println!("  {}", fact);
            }
        }
    }

    pub fn print_query(&self, report: &QueryReport) {
        println!("\n{}", "=== QUERY ===".bold().cyan());
        println!("  Select: {}", report.select.join(" "));
        println!("  Where: {}", report.patterns.join(" ^ "));
        println!("  Closure size: {}", report.closure_size);
        println!();

        if report.rows.is_empty() {
            println!("{}", "No answers".yellow());
            return;
        }
        println!(
            "{} {}",
            "ANSWERS".bold().yellow(),
            format!("({})", report.rows.len()).dimmed()
        );
        for row in &report.rows {
            if row.is_empty() {
                println!("  {}", "yes".green());
            } else {
                println!("  {}", row.join("\t"));
            }
        }
    }

    /// Prints the canonical form of a conjunction or rule and its mapping.
    pub fn print_shape(&self, rule: &Rule) {
        let (mapping, canonical) = rule.canonicalize();
        println!("{} {}", "Input:".bold(), rule);
        println!("{} {}", "Shape:".bold(), canonical.to_string().cyan());
        println!("{}", "Mapping:".bold());
        for (index, term) in mapping.iter() {
            println!("  {} -> {}", term, index.to_string().green());
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
