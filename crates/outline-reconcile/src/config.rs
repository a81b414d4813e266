//! Tunable matcher parameters.

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, ReconcileResult};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weights and thresholds for fuzzy slide matching.
///
/// The defaults reproduce the established matching behaviour; change them
/// only when tuning against a new corpus of outlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Weight of the content-fingerprint equality term.
    pub content_weight: f64,
    /// Weight of the title similarity term.
    pub title_weight: f64,
    /// Weight of the position proximity term.
    pub position_weight: f64,
    /// Minimum weighted score for a fuzzy match to be accepted.
    pub accept_threshold: f64,
    /// Title similarity when one normalized title contains the other.
    pub substring_similarity: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            content_weight: 0.5,
            title_weight: 0.3,
            position_weight: 0.2,
            accept_threshold: 0.5,
            substring_similarity: 0.8,
        }
    }
}

impl MatchConfig {
    /// Override the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = threshold;
        self
    }

    /// Check that weights are non-negative and sum to 1.0 and that the
    /// threshold and substring similarity lie in `[0, 1]`.
    pub fn validate(&self) -> ReconcileResult<()> {
        let weights = [
            ("content_weight", self.content_weight),
            ("title_weight", self.title_weight),
            ("position_weight", self.position_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ReconcileError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ReconcileError::InvalidConfig(format!(
                "weights must sum to 1.0, got {}",
                total
            )));
        }

        for (name, value) in [
            ("accept_threshold", self.accept_threshold),
            ("substring_similarity", self.substring_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ReconcileError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.accept_threshold, 0.5);
        assert_eq!(config.substring_similarity, 0.8);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = MatchConfig {
            content_weight: 0.6,
            ..MatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = MatchConfig {
            content_weight: 0.9,
            title_weight: -0.1,
            position_weight: 0.2,
            ..MatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("title_weight"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(MatchConfig::default().with_threshold(1.5).validate().is_err());
        assert!(MatchConfig::default().with_threshold(0.0).validate().is_ok());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{ "accept_threshold": 0.65 }"#).unwrap();
        assert_eq!(config.accept_threshold, 0.65);
        assert_eq!(config.content_weight, 0.5);
    }
}
