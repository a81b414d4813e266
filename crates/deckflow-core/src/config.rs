//! Deckflow settings.
//!
//! Settings come from an optional TOML file, then environment overrides:
//!
//! | variable                   | setting                    |
//! |----------------------------|----------------------------|
//! | `DECKFLOW_MATCH_THRESHOLD` | `matching.accept_threshold` |
//! | `DECKFLOW_MERGE_STRATEGY`  | `merge.strategy`           |
//! | `DECKFLOW_LOG_LEVEL`       | `logging.level`            |
//! | `DECKFLOW_LOG_JSON`        | `logging.json`             |
//!
//! Missing sections and keys fall back to their defaults.

use std::path::Path;

use outline_reconcile::{MatchConfig, MergeStrategy};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{DeckflowError, Result};

pub const ENV_MATCH_THRESHOLD: &str = "DECKFLOW_MATCH_THRESHOLD";
pub const ENV_MERGE_STRATEGY: &str = "DECKFLOW_MERGE_STRATEGY";
pub const ENV_LOG_LEVEL: &str = "DECKFLOW_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "DECKFLOW_LOG_JSON";

/// Merge behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub strategy: MergeStrategy,
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default verbosity when `RUST_LOG` is unset.
    pub level: String,
    /// Emit newline-delimited JSON instead of plain text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckflowSettings {
    pub matching: MatchConfig,
    pub merge: MergeSettings,
    pub logging: LoggingSettings,
}

impl DeckflowSettings {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Read a TOML settings file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| DeckflowError::SettingsRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)?.with_env_overrides()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MATCH_THRESHOLD) {
            self.matching.accept_threshold =
                raw.trim()
                    .parse()
                    .map_err(|_| DeckflowError::InvalidSetting {
                        key: ENV_MATCH_THRESHOLD.to_string(),
                        reason: format!("expected a number, got {:?}", raw),
                    })?;
        }
        if let Some(raw) = lookup(ENV_MERGE_STRATEGY) {
            self.merge.strategy = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = raw.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_LOG_JSON) {
            self.logging.json = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(DeckflowError::InvalidSetting {
                        key: ENV_LOG_JSON.to_string(),
                        reason: format!("expected true or false, got {:?}", raw),
                    })
                }
            };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        self.log_level()?;
        Ok(())
    }

    /// Parsed `logging.level`.
    pub fn log_level(&self) -> Result<Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| DeckflowError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: format!("unknown level {:?}", self.logging.level),
            })
    }
}
