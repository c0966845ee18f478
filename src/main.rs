// SPDX-License-Identifier: PMPL-1.0-or-later

//! abox-reasoner: derive the closure of an ABox under inference rules and
//! answer structured queries against it.

use abox_reasoner::catalog::KnowledgeBase;
use abox_reasoner::logic::{BuiltinRules, Rule};
use abox_reasoner::query::{FactStore, Query, QueryEvaluator};
use abox_reasoner::report::{self, DeriveReport, QueryReport, ReportFormatter, ReportOutputFormat};
use abox_reasoner::{Axiom, EngineConfig, Error, MatchMode};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "abox-reasoner")]
#[command(version)]
#[command(about = "Forward-chaining rule closure over binary-relation ABox facts")]
#[command(long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every fact the rules derive from a knowledge base
    Derive {
        /// Knowledge base file (JSON or YAML)
        #[arg(value_name = "KB")]
        kb: PathBuf,

        /// Only apply the named rule(s)
        #[arg(short, long)]
        rule: Vec<String>,

        /// Add the built-in ontology rule pack
        #[arg(short, long)]
        builtin: bool,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportOutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the canonical pattern shape of a conjunction or rule
    Shape {
        /// Atoms like `hasChild(#Dad,#Kid)`, or one rule `b1 ^ b2 -> h`
        #[arg(value_name = "ATOM", required = true)]
        atoms: Vec<String>,
    },

    /// Answer a structured query over the closure of a knowledge base
    Query {
        /// Knowledge base file (JSON or YAML)
        #[arg(value_name = "KB")]
        kb: PathBuf,

        /// Query file with `select` and `where` lists
        #[arg(value_name = "QUERY")]
        query: PathBuf,

        /// Add the built-in ontology rule pack
        #[arg(short, long)]
        builtin: bool,

        #[command(flatten)]
        engine: EngineArgs,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportOutputFormat,
    },

    /// List the built-in rule pack
    Rules,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine settings file (JSON or YAML); overrides the knowledge base's
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up after this many fixpoint rounds
    #[arg(long)]
    max_rounds: Option<usize>,

    /// How candidate tuples are matched against rule bodies
    #[arg(long, value_enum)]
    match_mode: Option<MatchMode>,

    /// Scan candidate tuples in parallel
    #[arg(long)]
    parallel: bool,
}

impl EngineArgs {
    fn resolve(&self, kb: &KnowledgeBase) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => kb.engine.clone(),
        };
        if let Some(limit) = self.max_rounds {
            config = config.with_max_rounds(limit);
        }
        if let Some(mode) = self.match_mode {
            config = config.with_match_mode(mode);
        }
        if self.parallel {
            config = config.with_parallel(true);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Derive {
            kb: kb_path,
            rule,
            builtin,
            engine,
            format,
            output,
        } => {
            let kb = load_kb(&kb_path, builtin)?;
            let config = engine.resolve(&kb)?;
            let rules = select_rules(&kb, &rule)?;
            info!(
                "deriving from {} facts with {} rules",
                kb.facts.len(),
                rules.len()
            );

            let reasoner = abox_reasoner::Reasoner::with_rules(rules, config);
            let saturation = reasoner.saturate(&kb.facts).map_err(explain)?;
            let report =
                DeriveReport::new(Some(&kb_path), &kb.facts, reasoner.rules(), &saturation);

            emit(&report, format, output, |r| ReportFormatter::new().print_derive(r))?;
        }

        Commands::Shape { atoms } => {
            let rule = parse_conjunction(&atoms)?;
            ReportFormatter::new().print_shape(&rule);
        }

        Commands::Query {
            kb: kb_path,
            query,
            builtin,
            engine,
            format,
        } => {
            let kb = load_kb(&kb_path, builtin)?;
            let config = engine.resolve(&kb)?;
            let query = Query::load(&query)?;

            let saturation = kb.reasoner(config).saturate(&kb.facts).map_err(explain)?;
            let mut store = FactStore::new(kb.facts.clone());
            store.extend(saturation.derived);

            let rows = QueryEvaluator::new(&store).answer(&query);
            let report = QueryReport::new(&query, store.len(), rows);
            emit(&report, format, None, |r| ReportFormatter::new().print_query(r))?;
        }

        Commands::Rules => {
            println!("{}", "Built-in rules:".bold());
            for rule in BuiltinRules::all()? {
                println!("  {:26} {}", rule.name.cyan(), rule);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_kb(path: &Path, builtin: bool) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::load(path)?;
    if builtin {
        kb.include_builtin()?;
    }
    if kb.rules.is_empty() {
        warn!("{} defines no rules; nothing will be derived", path.display());
    }
    Ok(kb)
}

fn select_rules(kb: &KnowledgeBase, names: &[String]) -> Result<Vec<Rule>> {
    if names.is_empty() {
        return Ok(kb.rules.clone());
    }
    names
        .iter()
        .map(|name| {
            kb.rule(name)
                .cloned()
                .ok_or_else(|| anyhow!("no rule named '{}'", name))
        })
        .collect()
}

/// Accepts either a single rule `b1 ^ b2 -> h` or a list of atoms.
fn parse_conjunction(atoms: &[String]) -> Result<Rule> {
    if atoms.iter().any(|atom| atom.contains("->")) {
        return atoms.join(" ").parse().context("parsing rule");
    }
    let body = atoms
        .join(" ^ ")
        .split('^')
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::parse::<Axiom>)
        .collect::<abox_reasoner::Result<Vec<_>>>()
        .context("parsing atoms")?;
    Ok(Rule::conjunction(body)?)
}

/// Surfaces the partial result of a round-limited run before failing.
fn explain(err: Error) -> anyhow::Error {
    if let Error::RoundLimitExceeded { partial, .. } = &err {
        eprintln!("{}", "Partial closure before the round limit:".yellow());
        for fact in partial {
            eprintln!("  {}", fact);
        }
    }
    err.into()
}

fn emit<T: serde::Serialize>(
    report: &T,
    format: ReportOutputFormat,
    output: Option<PathBuf>,
    print: impl FnOnce(&T),
) -> Result<()> {
    match (format, output) {
        (ReportOutputFormat::Text, None) => print(report),
        (ReportOutputFormat::Text, Some(path)) => {
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ReportOutputFormat::parse)
                .filter(|f| *f != ReportOutputFormat::Text)
                .unwrap_or(ReportOutputFormat::Json);
            report::save_report(report, format, &path)?;
            println!("Report saved to: {}", path.display());
        }
        (format, None) => println!("{}", format.serialize(report)?),
        (format, Some(path)) => {
            report::save_report(report, format, &path)?;
            println!("Report saved to: {}", path.display());
        }
    }
    Ok(())
}
