//! Error types for record ingestion

use thiserror::Error;

use crate::RecordId;

/// Result type alias for ingestion
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Reasons a batch or a record is rejected before it reaches the engine
#[derive(Error, Debug)]
pub enum IngestError {
    /// The batch is not valid JSON or not an array
    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    /// A batch entry is not a JSON object
    #[error("Record at index {index} is not an object")]
    NotAnObject { index: usize },

    /// A required field is absent or null
    #[error("Record at index {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// A field is present but has the wrong shape
    #[error("Record at index {index} has invalid field '{field}': {message}")]
    InvalidField {
        index: usize,
        field: &'static str,
        message: String,
    },

    /// Two records in one batch share an id
    #[error("Duplicate record id {id} at index {index}")]
    DuplicateId { id: RecordId, index: usize },
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::MalformedBatch(err.to_string())
    }
}
