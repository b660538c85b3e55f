//! Error types for run input and output.

use std::path::PathBuf;

use pilesim_controllers::ControlError;
use thiserror::Error;

pub type IoResult<T> = Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Parse or validation failure; `message` says where.
    #[error("invalid file content: {message}")]
    InvalidContent { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// A metric read or controller action failed mid-run.
    #[error(transparent)]
    Control(#[from] ControlError),
}

impl IoError {
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent { message: message.into() }
    }

    /// Map `NotFound` onto [`IoError::FileNotFound`] so callers see the path.
    pub(crate) fn open(path: &std::path::Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path: path.to_path_buf() }
        } else {
            Self::Io(e)
        }
    }
}
