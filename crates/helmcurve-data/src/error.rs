//! Data layer error types.

use thiserror::Error;

/// Errors raised while locating or fetching result files.
#[derive(Debug, Error)]
pub enum DataError {
    /// The task is not in the catalog.
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// The storage server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl DataError {
    /// Returns `true` if the file does not exist upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::Http { status: 404, .. })
    }
}
