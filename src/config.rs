use crate::align::AlignmentScoring;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for scoring an attempt. Anything missing from a config file takes the default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    /// Scores for both the word level and character level alignments
    pub alignment: AlignmentScoring,
    /// Words below this phoneme accuracy (percent) are suggested for practice
    pub practice_threshold: f64,
}

impl ScoringConfig {
    pub const DEFAULT_PRACTICE_THRESHOLD: f64 = 80.0;

    /// Loads a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(data)?;
        Ok(config)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentScoring::default(),
            practice_threshold: Self::DEFAULT_PRACTICE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.alignment.match_score, 2);
        assert_eq!(config.alignment.mismatch_score, -1);
        assert_eq!(config.alignment.indel_score, -1);
        assert_eq!(config.practice_threshold, 80.0);

        assert_eq!(ScoringConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn partial_config() {
        let config =
            ScoringConfig::from_json(r#"{"alignment": {"indelScore": -2}, "practiceThreshold": 90}"#)
                .unwrap();
        assert_eq!(config.alignment.match_score, 2);
        assert_eq!(config.alignment.indel_score, -2);
        assert_eq!(config.practice_threshold, 90.0);
    }

    #[test]
    fn bad_config() {
        assert!(ScoringConfig::from_json(r#"{"practiceThreshold": "high"}"#).is_err());
        assert!(ScoringConfig::load("/definitely/not/here.json").is_err());
    }
}
