use eao_core::{CodecError, KindMismatch, PathError};
use eao_engine::SolveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Could not decode document: {0}")]
    Decode(#[from] CodecError),

    #[error("Expected a {expected} document, got a {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Key '{0}' is derived from 'portf' and cannot be written directly")]
    DerivedKey(String),

    #[error("Asset '{asset}' references node '{node}', which is neither in the portfolio nor a standard node")]
    UnresolvedReference { asset: String, node: String },

    #[error("Asset '{asset}' has a malformed node entry at position {position}")]
    MalformedReference { asset: String, position: usize },

    #[error("Parameter edit rejected: {0}")]
    Path(#[from] PathError),

    #[error("Asset '{0}' already exists in the portfolio")]
    DuplicateAsset(String),

    #[error("Asset name '{0}' is reserved by the optimisation summary")]
    ReservedName(String),

    #[error("Timegrid has {steps} steps; at most {max} can be optimised")]
    CapacityExceeded { steps: usize, max: usize },

    #[error("Unknown solver '{name}' (available: {available})")]
    UnknownSolver { name: String, available: String },

    #[error("Optimisation failed: {0}")]
    Solve(#[from] SolveError),
}

impl SessionError {
    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Decode(_) => "decode",
            SessionError::WrongKind { .. } => "wrong_kind",
            SessionError::NotFound(_) => "not_found",
            SessionError::DerivedKey(_) => "derived_key",
            SessionError::UnresolvedReference { .. } => "unresolved_reference",
            SessionError::MalformedReference { .. } => "malformed_reference",
            SessionError::Path(_) => "path",
            SessionError::DuplicateAsset(_) => "duplicate_asset",
            SessionError::ReservedName(_) => "reserved_name",
            SessionError::CapacityExceeded { .. } => "capacity_exceeded",
            SessionError::UnknownSolver { .. } => "unknown_solver",
            SessionError::Solve(_) => "solve",
        }
    }
}

impl From<KindMismatch> for SessionError {
    fn from(err: KindMismatch) -> Self {
        match err {
            KindMismatch::Codec(e) => SessionError::Decode(e),
            KindMismatch::Wrong { expected, found } => SessionError::WrongKind { expected, found },
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
