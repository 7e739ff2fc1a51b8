//! Error types for lightwire
//!
//! Provides a unified error type for all operations. Every variant belongs to
//! one [`ErrorKind`], which is what callers usually branch on.

use thiserror::Error;

/// Result type alias using LightError
pub type Result<T> = std::result::Result<T, LightError>;

/// Broad failure category of a [`LightError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Socket level failure; the caller has to reconnect explicitly
    Connection,

    /// Parameter outside its domain, detected before any I/O
    Validation,

    /// The device sent something we could not make sense of
    Protocol,

    /// The device answered with an error object
    Device,

    /// Invalid client configuration
    Config,
}

/// Unified error type for lightwire operations
#[derive(Debug, Error)]
pub enum LightError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Connection to {addr} timed out after {timeout_ms} ms")]
    ConnectTimeout { addr: String, timeout_ms: u64 },

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Device is offline: {0}")]
    DeviceOffline(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Connection already closed")]
    AlreadyDisconnected,

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Response id {0} does not match any pending request")]
    UnmatchedResponse(u64),

    #[error("Property count mismatch: requested {expected}, got {actual}")]
    PropertyCountMismatch { expected: usize, actual: usize },

    #[error("No response to request {0} before the read timeout")]
    NoResponse(u64),

    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("Device error {code}: {message}")]
    Device { code: i64, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LightError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LightError::Io(_)
            | LightError::InvalidAddress(_)
            | LightError::ConnectTimeout { .. }
            | LightError::ConnectionClosed(_)
            | LightError::DeviceOffline(_)
            | LightError::NotConnected
            | LightError::AlreadyDisconnected => ErrorKind::Connection,
            LightError::Validation(_)
            | LightError::UnknownMethod(_)
            | LightError::UnknownProperty(_) => ErrorKind::Validation,
            LightError::Protocol(_)
            | LightError::UnmatchedResponse(_)
            | LightError::PropertyCountMismatch { .. }
            | LightError::NoResponse(_) => ErrorKind::Protocol,
            LightError::Device { .. } => ErrorKind::Device,
            LightError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_protocol(&self) -> bool {
        self.kind() == ErrorKind::Protocol
    }

    pub fn is_device(&self) -> bool {
        self.kind() == ErrorKind::Device
    }

    /// Shorthand used by the validators
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LightError::Validation(message.into())
    }
}

impl From<serde_json::Error> for LightError {
    fn from(err: serde_json::Error) -> Self {
        LightError::Protocol(format!("Malformed JSON: {}", err))
    }
}
