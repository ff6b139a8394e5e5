use thiserror::Error;

/// Errors raised by index construction, querying and the corpus/config boundary.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid document id: {0:?}")]
    InvalidDocumentId(String),

    #[error("document already ingested: {0}")]
    DuplicateDocument(String),

    #[error("index is not finalized; call finalize() before querying")]
    NotFinalized,

    #[error("index is finalized; cannot ingest document {0}")]
    AlreadyFinalized(String),

    #[error("unknown search mode: {0}")]
    UnknownSearchMode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True for errors caused by the caller passing a bad document id.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::InvalidDocumentId(_) | CoreError::DuplicateDocument(_))
    }

    /// True for errors caused by calling an operation in the wrong lifecycle phase.
    pub fn is_state(&self) -> bool {
        matches!(self, CoreError::NotFinalized | CoreError::AlreadyFinalized(_))
    }
}
