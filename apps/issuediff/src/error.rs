//! Error types for issuediff.
//!
//! Noise in tool logs is not an error: parsers return `None` for lines and
//! blocks they cannot interpret. Only structural failures end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for issuediff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by issue construction, parsing, and revision handling.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed `Issue` input (unknown category, non-numeric line).
    #[error("Invalid issue: {message}")]
    Validation { message: String },

    /// A parser operation the tool does not provide.
    #[error("{operation} is not implemented for {tool}")]
    NotImplemented {
        tool: &'static str,
        operation: &'static str,
    },

    /// The log of a revision could not be opened or read.
    #[error("{tool}: cannot read log of revision {revision} at {}: {source}", .path.display())]
    Io {
        tool: &'static str,
        revision: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analyzer document of a revision is not valid or has the wrong shape.
    #[error("{tool}: invalid document for revision {revision} at {}: {source}", .path.display())]
    Schema {
        tool: &'static str,
        revision: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A built-in regular expression failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Revision resolution failed.
    #[error("Revision error: {message}")]
    Revision { message: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn revision(message: impl Into<String>) -> Self {
        Error::Revision {
            message: message.into(),
        }
    }
}
