//! Error type shared by every stage.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    /// The caller broke a documented precondition (bad indices, bad axes, bad tolerance).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An algorithm invariant failed. Valid input never produces this.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}

impl TriangulationError {
    pub fn is_internal(&self) -> bool {
        matches!(self, TriangulationError::InternalInconsistency(_))
    }
}

pub type Result<T> = std::result::Result<T, TriangulationError>;
