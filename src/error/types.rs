//! Error types for the runlink client.

use std::time::Duration;
use thiserror::Error;

/// Main error type for client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Outbound message failed local schema checks. Surfaced before any I/O.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Socket-level failure. Fatal for the current handshake, never retried.
    #[error("Connection error: {kind}")]
    Connection { kind: ConnectionErrorKind },

    /// Received bytes do not form a valid frame. Fatal, never retried.
    #[error("Framing error: {kind}")]
    Framing { kind: FramingErrorKind },

    /// The receive loop exhausted its configured attempt bound.
    ///
    /// Distinct from `Connection` so callers can tell "peer is slow"
    /// from "peer is broken".
    #[error("Timed out waiting for response after {attempts} attempts ({per_attempt:?} per attempt)")]
    TimeoutExceeded { attempts: u32, per_attempt: Duration },

    /// Cooperative cancellation was requested between receive attempts.
    #[error("Handshake cancelled")]
    Cancelled,
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Message has a missing or empty 'type' field")]
    MissingType,

    #[error("Raw newline in '{field}' would corrupt line framing")]
    EmbeddedNewline { field: String },

    #[error("Message is not JSON-serializable: {message}")]
    NotSerializable { message: String },
}

/// Connection error kinds.
#[derive(Error, Debug)]
pub enum ConnectionErrorKind {
    #[error("Failed to connect to {addr}: {message}")]
    ConnectFailed { addr: String, message: String },

    #[error("Connection to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("Failed to send frame: {message}")]
    SendFailed { message: String },

    #[error("Connection closed by peer")]
    ClosedByPeer,

    #[error("Failed to read from socket: {message}")]
    ReceiveFailed { message: String },

    #[error("Connection is closed")]
    NotConnected,
}

/// Framing error kinds.
#[derive(Error, Debug)]
pub enum FramingErrorKind {
    #[error("Frame is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame has a missing or empty 'type' field")]
    MissingType,

    #[error("Frame 'type' field is not a string")]
    TypeNotString,

    #[error("Frame too large: {size} bytes exceeds maximum of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
