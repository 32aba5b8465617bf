//! MrP client errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when interacting with the MrP API
#[derive(Debug, Error)]
pub enum MrpError {
    /// HTTP request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// MrP answered with a non-2xx status
    #[error("HTTP ERROR {status} on {method} request at {url}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// MrP answered 2xx but the body is not JSON
    #[error("JSON ERROR on {method} request at {url}: {body}")]
    InvalidJson {
        method: &'static str,
        url: String,
        body: String,
    },

    /// JSON did not match the expected record shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, wrong URL, etc.)
    #[error("Invalid URL or token for MrP: {0}")]
    Authentication(String),

    /// A required record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A machine name matched more than one record
    #[error("More than one machine found with name '{name}' ({count} matches)")]
    AmbiguousName { name: String, count: usize },

    /// A preseed referenced by name does not exist
    #[error("Unknown preseed '{0}'")]
    UnknownPreseed(String),

    /// Caller supplied an invalid or contradictory argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A record lacks the data needed to compute a derived value
    #[error("Incomplete record: {0}")]
    Incomplete(String),

    /// Local file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MrpError {
    /// HTTP status carried by a `Status` error
    pub fn status(&self) -> Option<u16> {
        match self {
            MrpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
