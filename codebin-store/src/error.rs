//! Error types for the store crate.

use std::path::PathBuf;

use codebin_core::CoreError;

/// Failures of the underlying key-value store.
///
/// Every variant is an I/O-class failure from the caller's point of view;
/// the store never retries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored record could not be encoded or decoded.
    #[error("corrupt record at {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record sits under a file name that is not derived from its id, so
    /// it cannot be reached or removed by key.
    #[error("record at {} does not belong to id {id:?}", path.display())]
    Misplaced { path: PathBuf, id: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn codec(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Codec { path: path.into(), source }
    }
}

/// Errors returned by [`SnippetLifecycle`](crate::SnippetLifecycle) operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LifecycleError {
    /// Malformed input: empty id or missing content.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store failed; not retried.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<CoreError> for LifecycleError {
    fn from(err: CoreError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
