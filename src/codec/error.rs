use crate::table::TableError;

/// Errors that can occur while loading or saving binary event files
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input is not a valid binary event file, or is truncated
    #[error("Failed to load events: {0}")]
    Load(String),

    /// The table could not be written
    #[error("Failed to save events: {0}")]
    Save(String),

    /// Bad argument passed to the codec
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error raised by the event table
    #[error("Table error: {0}")]
    TableError(#[from] TableError),
}
