use std::io;

use thiserror::Error;

/// Errors surfaced by index construction, persistence and loading.
///
/// "No match" is never an error: queries against terms absent from the
/// index return empty results. `Corruption` is reserved for a persisted
/// index the loader refuses to serve from.
#[derive(Error, Debug)]
pub enum IndexError {
    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Missing or unusable configuration input (stopword file, corpus dir).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed persisted index: field-count mismatch, non-numeric
    /// postings, or postings/weights disagreement.
    #[error("corrupt index: {0}")]
    Corruption(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        IndexError::Config(msg.into())
    }

    pub fn corruption<S: Into<String>>(msg: S) -> Self {
        IndexError::Corruption(msg.into())
    }
}
