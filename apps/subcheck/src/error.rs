//! Error taxonomy for the submission pipeline.
//!
//! Archive-level failures abort the whole run. Per-file engine failures are
//! represented by `EngineFailure` but never leave a validator: they are turned
//! into a synthetic `validation-error` issue (see `checks::finish`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("archive exceeds {what} limit: {actual} > {limit}")]
    LimitExceeded {
        what: &'static str,
        limit: u64,
        actual: u64,
    },
}

impl ArchiveError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ArchiveError::InvalidArchive(msg.into())
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::InvalidArchive(e.to_string())
    }
}

/// The underlying rule engine of a validator could not process the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct EngineFailure {
    pub reason: String,
}

impl EngineFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Failure anchored at a 1-based source position, e.g. `Unclosed block (3:7)`.
    pub fn at(reason: &str, line: usize, column: usize) -> Self {
        Self::new(format!("{} ({}:{})", reason, line, column))
    }
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("could not read your archive: {0}")]
    Archive(#[from] ArchiveError),

    #[error("no valid files found for validation")]
    NoValidatableFiles,
}

/// A saved check record could not be written or read back.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = SubmissionError> = std::result::Result<T, E>;
