//! Error type for core persistence operations.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed to serialize value: {0}")]
    Serialization(serde_json::Error),
    #[error("stored value under '{key}' is malformed: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("key-value store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid text: {0}")]
    Text(#[from] medwise_types::TextError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
