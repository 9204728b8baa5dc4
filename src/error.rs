//! Error types for the extraction pipeline.
//!
//! Missing fields are not errors: the extractor substitutes a placeholder
//! and carries on. Only unreadable input and unwritable output abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by the core pipeline.
#[derive(Debug, Error)]
pub enum CacusError {
    /// The input document could not be read or is not well-formed.
    #[error("failed to parse input {}: {message}", path.display())]
    InputParse { path: PathBuf, message: String },

    /// The destination could not be created or written.
    #[error("failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacusError {
    pub fn input_parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::InputParse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacusError>;
