//! Error types for statement classification.

use crate::tree::ParseError;

/// Errors that can occur while classifying a statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The statement text could not be turned into a token tree.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The normalized command tag has no extractor.
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// A constraint keyword outside the supported set.
    #[error("Malformed constraint: {0}")]
    MalformedConstraint(String),

    /// The tree does not have the structure the extractor relies on.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),
}

impl ClassifyError {
    pub(crate) fn mismatch(detail: impl Into<String>) -> Self {
        Self::StructuralMismatch(detail.into())
    }
}

/// Result type for classification.
pub type Result<T> = std::result::Result<T, ClassifyError>;
