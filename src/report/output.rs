// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for printed/exported reports

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportOutputFormat {
    Text,
    Json,
    Yaml,
}

impl ReportOutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportOutputFormat::Text),
            "json" => Some(ReportOutputFormat::Json),
            "yaml" | "yml" => Some(ReportOutputFormat::Yaml),
            _ => None,
        }
    }

    /// Machine-readable rendering; text output goes through the formatter.
    pub fn serialize<T: Serialize>(&self, report: &T) -> Result<String> {
        match self {
            ReportOutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportOutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            ReportOutputFormat::Text => bail!("text reports are printed, not serialized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        derived: Vec<String>,
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ReportOutputFormat::parse("YML"), Some(ReportOutputFormat::Yaml));
        assert_eq!(ReportOutputFormat::parse("json"), Some(ReportOutputFormat::Json));
        assert_eq!(ReportOutputFormat::parse("nickel"), None);
    }

    #[test]
    fn test_serialize_json_and_yaml() {
        let sample = Sample {
            derived: vec!["subClassOf(A,C)".into()],
        };
        let json = ReportOutputFormat::Json.serialize(&sample).unwrap();
        assert!(json.contains("\"subClassOf(A,C)\""));
        let yaml = ReportOutputFormat::Yaml.serialize(&sample).unwrap();
        assert!(yaml.contains("subClassOf(A,C)"));
        assert!(ReportOutputFormat::Text.serialize(&sample).is_err());
    }
}
