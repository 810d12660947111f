//! Typed error hierarchy for the build engine.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Every error kind a caller can observe from a build run.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("input `{key}` does not exist and no task produces it")]
    InputMissing { key: String },

    #[error("task `{new_owner}` and `{existing_owner}` both claim exact target `{key}`")]
    DuplicateTarget {
        key: String,
        existing_owner: String,
        new_owner: String,
    },

    #[error("action for task `{task}` failed: {message}")]
    ActionFailed { task: String, message: String },

    #[error("state store I/O error for task `{task}`: {source}")]
    StoreIo {
        task: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state store could not (de)serialize state: {0}")]
    StoreSerde(#[from] StoreSerdeError),

    #[error("pattern `{pattern}` references capture `<{name}>` which no input supplies")]
    PatternError { pattern: String, name: String },

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Wraps the store's serialization backend error so `BuildError` doesn't
/// need to know which serde format is in use.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreSerdeError(pub String);

#[cfg(feature = "serde")]
impl From<serde_json::Error> for StoreSerdeError {
    fn from(e: serde_json::Error) -> Self {
        StoreSerdeError(e.to_string())
    }
}
