// src/error.rs
// =============================================================================
// Library error types.
//
// Almost nothing in the validation engine is an error: a broken link is a
// Problem, which is ordinary data. The one real failure is not being able to
// read a document from disk, and even that is turned into a Problem by the
// validator before it reaches the caller.
// =============================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be opened or read (missing, permission denied,
    /// not valid UTF-8, ...)
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DocumentError::Read {
            path: path.into(),
            source,
        }
    }
}
