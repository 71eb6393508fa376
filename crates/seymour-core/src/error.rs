//! Error types for parameter access

use thiserror::Error;

/// Errors that can occur when addressing or changing parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Flat index past the end of the parameter table
    #[error("Parameter index {index} out of bounds (have {count} params)")]
    UnknownIndex { index: usize, count: usize },
}

/// Result type for parameter operations
pub type ParamResult<T> = Result<T, ParamError>;
