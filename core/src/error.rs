use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A record failed validation; the whole build is abandoned.
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A query was issued before any index was built.
    #[error("no index has been built yet")]
    InvalidQueryState,

    #[error("invalid search config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input parsed but is neither a record array nor a `{"docs": [...]}` object.
    #[error("unrecognized search index format: {0}")]
    UnrecognizedFormat(String),
}

impl Error {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord { index, reason: reason.into() }
    }
}
