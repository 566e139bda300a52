//! Error handling for CellView
//!
//! Provides error types for every layer of the front panel:
//! - Connection errors (HTTP transport to the instrument API)
//! - Panel errors (dial geometry, sector and surface input)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors raised while talking to the instrument's HTTP API.
/// A timeout is kept apart from every other transport failure because the
/// screen poller recovers from the former and alerts on the latter.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// The request did not complete within its deadline
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The server answered with an unexpected HTTP status
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus {
        /// The endpoint that was called.
        endpoint: String,
        /// The status code returned.
        status: u16,
    },

    /// The request could not be delivered
    #[error("Transport error on {endpoint}: {reason}")]
    Transport {
        /// The endpoint that was called.
        endpoint: String,
        /// The underlying reason.
        reason: String,
    },

    /// The configured base URL cannot be used
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The response body did not match the `{success, data}` envelope
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode {
        /// The endpoint that was called.
        endpoint: String,
        /// The decoding failure.
        reason: String,
    },

    /// A request was refused before being sent
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was refused.
        reason: String,
    },
}

/// Panel error type
///
/// Represents invalid input reaching the panel widgets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    /// Sector number outside 1..=12
    #[error("Sector {value} out of range 1..={max}")]
    SectorOutOfRange {
        /// The rejected sector number.
        value: u8,
        /// The highest valid sector.
        max: u8,
    },

    /// A coordinate or angle was not a finite number
    #[error("Non-finite {what}: {value}")]
    NonFinite {
        /// What was being computed.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Touch scale must be strictly positive
    #[error("Invalid touch scale {scale}")]
    InvalidScale {
        /// The rejected scale.
        scale: f64,
    },

    /// A poller timing that cannot be scheduled
    #[error("Invalid poller timing '{what}': {reason}")]
    InvalidTiming {
        /// The offending setting.
        what: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Main error type for CellView
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Panel error
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ConnectionTimeout { .. })
        )
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a panel error
    pub fn is_panel_error(&self) -> bool {
        matches!(self, Error::Panel(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
