use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Invalid document: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Parameter path is empty")]
    Empty,

    #[error("No parameter at {0}")]
    Missing(String),

    #[error("Parameter {0} cannot be edited")]
    Protected(String),

    #[error("Value rejected at {path}: {reason}")]
    Rejected { path: String, reason: String },
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
