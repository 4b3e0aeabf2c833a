use super::values::ValueType;

/// Errors raised by event table operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    /// Bad name, duplicate name, or inconsistent structure
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Parameter or event index outside the table
    #[error("{what} index {index} out of range (length {len})")]
    OutOfRange {
        /// Which kind of index was checked ("parameter" or "event")
        what: &'static str,
        /// The offending index
        index: usize,
        /// Number of valid positions
        len: usize,
    },

    /// Typed access requested a precision the column does not store
    #[error("Type mismatch: parameter {index} stores {actual} values, {requested} requested")]
    TypeMismatch {
        /// Parameter index
        index: usize,
        /// Precision asked for
        requested: ValueType,
        /// Precision actually stored
        actual: ValueType,
    },

    /// Spillover matrix that cannot be used for compensation
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),
}
