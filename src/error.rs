//! Configuration and boundary errors
//!
//! These are failures to build engine inputs (unreadable files, malformed
//! documents, records that violate a data contract). Business verdicts such
//! as a failed allocation total are not errors; see [`crate::verdict`].

use thiserror::Error;

/// Errors raised while loading configuration or decoding boundary records
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// A limit record with zero or two values populated for one pair, or a
    /// value that does not match its declared mode
    #[error("invalid limit spec: {0}")]
    InvalidLimitSpec(String),

    #[error("unknown insured kind: {0}")]
    UnknownInsuredKind(String),

    #[error("unknown limit mode: {0}")]
    UnknownLimitMode(String),

    #[error("route template '{template}' references unknown placeholder '{name}'")]
    UnknownPlaceholder { template: String, name: String },

    #[error("route template '{0}' has an unterminated placeholder")]
    MalformedTemplate(String),

    #[error("position ({step}, {sub_step}) is outside the configured wizard")]
    PositionOutOfRange { step: usize, sub_step: usize },

    #[error("entry rule references unknown wizard label '{0}'")]
    UnknownLabel(String),

    #[error("wizard configuration has no steps")]
    EmptyWizard,
}

/// Result alias for engine configuration and decoding
pub type Result<T> = std::result::Result<T, EngineError>;
