use thiserror::Error;

/// Errors produced by type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {field}: {reason}")]
    InvalidName { field: &'static str, reason: String },

    #[error("invalid page: {0}")]
    InvalidPage(String),
}
