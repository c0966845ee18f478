// SPDX-License-Identifier: PMPL-1.0-or-later

//! Engine configuration loading.

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a candidate tuple is compared against a rule body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The tuple's canonical shape must equal the body's shape. Distinct
    /// body variables must bind distinct terms.
    Exact,
    /// The body's shape must map onto the tuple. Distinct body variables
    /// may bind the same term, so one fact can fill positions that share
    /// no variable.
    #[default]
    Specializing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on fixpoint rounds; `None` runs until stable.
    pub max_rounds: Option<usize>,
    pub match_mode: MatchMode,
    /// Scan candidate tuples on the rayon pool.
    pub parallel: bool,
    /// Minimum tuples per round before the parallel scan kicks in.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            match_mode: MatchMode::default(),
            parallel: false,
            parallel_threshold: 4096,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json engine config {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml engine config {}", path.display())),
            _ => Err(anyhow!(
                "unsupported engine config extension for {}",
                path.display()
            )),
        }
    }

    pub fn with_max_rounds(mut self, limit: usize) -> Self {
        self.max_rounds = Some(limit);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_rounds, None);
        assert_eq!(config.match_mode, MatchMode::Specializing);
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_yaml_with_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.yaml");
        fs::write(&path, "max_rounds: 12\nmatch_mode: exact\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_rounds, Some(12));
        assert_eq!(config.match_mode, MatchMode::Exact);
        assert_eq!(config.parallel_threshold, 4096);
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"parallel": true, "parallel_threshold": 10}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert!(config.parallel);
        assert_eq!(config.parallel_threshold, 10);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "max_rounds = 3").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }
}
