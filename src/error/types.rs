use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of share-rejection codes surfaced to miners.
///
/// Upstream-originated rejection reasons (low difficulty, duplicate
/// share, ...) are relayed to the client as opaque strings and are
/// never mapped into this set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[default]
    NoError,
    /// No usable upstream connection at submission time.
    BadGateway,
    /// Job id outside the two-generation freshness window.
    InvalidJobId,
}

impl ErrorCode {
    /// Human-readable message, used verbatim when replying to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoError => "no error",
            Self::BadGateway => "Bad gateway",
            Self::InvalidJobId => "Invalid job id",
        }
    }

    pub fn is_rejected(&self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Error types for the multiplexing core.
///
/// Share-validation failures are not errors: they resolve locally on
/// the submit event as an [`ErrorCode`]. Persistent upstream failure
/// degrades to inactive mappers, never to a crate error.
#[derive(Error, Debug)]
pub enum StratumError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event arena busy: an event is already in flight")]
    EventArenaBusy,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("No pools configured (at least one upstream is required)")]
    NoPools,

    #[error("Invalid port: {port} (must be between 1 and 65535)")]
    InvalidPort { port: u16 },

    #[error("Invalid duration: {field} = {duration:?} (must be > 0)")]
    InvalidDuration { field: String, duration: Duration },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Result type alias for the multiplexing core
pub type Result<T> = std::result::Result<T, StratumError>;
