//! The loader's failure taxonomy (`spec.md` §4.7 "Failure taxonomy").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("malformed JSON spec: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid spec: {reason}")]
    InvalidSpec { reason: String },

    #[error("limit exceeded: {limit}")]
    LimitsExceeded { limit: &'static str },
}

impl SpecError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SpecError::InvalidSpec { reason: reason.into() }
    }
}
