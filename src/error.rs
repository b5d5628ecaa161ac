//! Configuration errors
//!
//! The simulation itself never fails: bad per-tick input is skipped. Only
//! configuration is rejected, and it is rejected up front.

/// Errors raised while building or validating a round configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown game mode: {0}")]
    UnknownMode(String),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
