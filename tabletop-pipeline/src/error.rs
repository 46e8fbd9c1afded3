use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that stop a pipeline pass.
///
/// Per-entry problems (a failed search, a missing game, a bad image) never
/// become a `PipelineError`; they are logged and recorded in the run log.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot read input list {}: {source}", path.display())]
    InputList {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid store {}: {message}", path.display())]
    InvalidStore { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn input_list(path: &Path, source: std::io::Error) -> Self {
        Self::InputList {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn persist(path: &Path, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_store(path: &Path, message: impl Into<String>) -> Self {
        Self::InvalidStore {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
