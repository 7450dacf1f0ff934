//! Error types for butterfly-directions
//!
//! Every failure of a directions request is reported through [`Error`];
//! nothing is retried and no partial route is ever returned.

use thiserror::Error;

use crate::core::network::NodeId;

/// Main error type for butterfly-directions operations
#[derive(Debug, Error)]
pub enum Error {
    /// The remote directions provider failed (non-2xx response or transport error).
    ///
    /// `status_code` is `None` when no HTTP response was received at all.
    #[error("Directions provider error (status {}): {body}", display_status(.status_code))]
    Adapter {
        status_code: Option<u16>,
        body: String,
    },

    /// The local way network has no path between the two nodes
    #[error("No local route from node {from} to node {to}")]
    NoRoute { from: NodeId, to: NodeId },

    /// Invalid endpoint or an endpoint that cannot be snapped
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed options or network document
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl Error {
    /// Build an adapter error from a provider response
    pub fn adapter(status_code: u16, body: impl Into<String>) -> Self {
        Error::Adapter {
            status_code: Some(status_code),
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Adapter {
            status_code: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Convenience result type for butterfly-directions operations
pub type Result<T> = std::result::Result<T, Error>;
