//! Error taxonomy for Deckflow services.

use std::path::PathBuf;

/// Deckflow errors.
#[derive(Debug, thiserror::Error)]
pub enum DeckflowError {
    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("failed to render settings: {0}")]
    SettingsRender(#[from] toml::ser::Error),

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("reconcile error: {0}")]
    Reconcile(#[from] outline_reconcile::ReconcileError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Deckflow operations.
pub type Result<T> = std::result::Result<T, DeckflowError>;
