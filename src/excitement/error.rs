use thiserror::Error;

/// Reasons a sample stream cannot go through the full model.
///
/// Both are recoverable: `score_game` degrades to the margin heuristic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("no win-probability samples")]
    NoData,

    #[error("insufficient win-probability samples: got {got}, need {required}")]
    InsufficientData { got: usize, required: usize },
}

/// Rejected algorithm configuration. Only raised at load time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("component weights must be non-negative and sum to 1.0 (got {sum:.4})")]
    InvalidWeights { sum: f64 },

    #[error("tier cutoffs for {scope} must satisfy 10 >= must_watch > recommended > 0 (got {must_watch} / {recommended})")]
    InvalidTiers {
        scope: String,
        must_watch: f64,
        recommended: f64,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse algorithm config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
