//! Error types for ril-client.

use std::fmt;

use thiserror::Error;

/// Failure code reported by the modem in a solicited response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioError(pub i32);

impl RadioError {
    pub const SUCCESS: RadioError = RadioError(0);
    pub const RADIO_NOT_AVAILABLE: RadioError = RadioError(1);
    pub const GENERIC_FAILURE: RadioError = RadioError(2);
    pub const PASSWORD_INCORRECT: RadioError = RadioError(3);
    pub const SIM_PIN2: RadioError = RadioError(4);
    pub const SIM_PUK2: RadioError = RadioError(5);
    pub const REQUEST_NOT_SUPPORTED: RadioError = RadioError(6);
    pub const CANCELLED: RadioError = RadioError(7);

    /// Symbolic name for well-known codes.
    pub fn name(&self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "SUCCESS",
            1 => "RADIO_NOT_AVAILABLE",
            2 => "GENERIC_FAILURE",
            3 => "PASSWORD_INCORRECT",
            4 => "SIM_PIN2",
            5 => "SIM_PUK2",
            6 => "REQUEST_NOT_SUPPORTED",
            7 => "CANCELLED",
            _ => return None,
        })
    }
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Main error type for all ril-client operations.
///
/// Only [`RilError::Remote`], [`RilError::DecodeFault`] and
/// [`RilError::Unsupported`] reach a caller as the result of a request;
/// protocol errors and unknown serials are logged by the dispatcher and
/// never leave it. [`RilError::ConnectionClosed`] is delivered to requests
/// still in flight when the session tears down.
#[derive(Debug, Error)]
pub enum RilError {
    /// I/O error on the underlying byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading property overrides.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed record: truncated field, bad discriminator, bad length.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Solicited response for a serial with no pending request.
    #[error("Unknown serial: {0}")]
    UnknownSerial(u32),

    /// Explicit non-zero status from the modem.
    #[error("Remote error: {0}")]
    Remote(RadioError),

    /// A response decoder rejected a well-formed payload.
    #[error("Decode fault: {0}")]
    DecodeFault(String),

    /// Command intentionally disabled for this device.
    #[error("Request not supported: {0}")]
    Unsupported(String),

    /// Session closed before the request was resolved.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Writer queue stayed full past the configured timeout.
    #[error("Backpressure timeout")]
    BackpressureTimeout,
}

impl RilError {
    /// Wrap any decoder failure as a [`RilError::DecodeFault`].
    pub(crate) fn into_decode_fault(self) -> RilError {
        match self {
            RilError::DecodeFault(_) => self,
            other => RilError::DecodeFault(other.to_string()),
        }
    }
}

/// Result type alias using RilError.
pub type Result<T> = std::result::Result<T, RilError>;
