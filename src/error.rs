//! Typed errors for the operation pipeline.

/// Result type for operation and pipeline calls
pub type OpResult<T> = Result<T, OpError>;

/// Error taxonomy for dataset operations. Everything here is recoverable:
/// the pipeline converts these into status messages and leaves the session
/// dataset untouched.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Operation can be performed only between numeric columns: '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("Operation group not found: {0}")]
    UnknownGroup(String),

    #[error("Operation not found: {0}")]
    UnknownOperation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}
