//! Ingestion errors

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn trace-file bytes into entries
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse HAR file: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("Invalid HAR file format: {0}")]
    Shape(String),
}

impl ParseError {
    /// Shape failure for a single entry record
    pub(crate) fn entry(index: usize, err: serde_json::Error) -> Self {
        ParseError::Shape(format!("entry {}: {}", index, err))
    }
}

/// Failure anywhere along the import path
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Please drop a valid .har file ({})", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
