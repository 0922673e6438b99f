//! Error types for feedflow-link.
//!
//! This module defines all error types that can occur while talking to a
//! feeder over its serial channel.
//!
//! # Recovery strategies
//!
//! | Error type | Strategy | Rationale |
//! |------------|----------|-----------|
//! | [`Error::ConnectionFailed`] | Retried by the link up to the configured bound | Peer unreachable / RF error is usually transient |
//! | [`Error::Io`] | Surfaced once as a disconnection | Mid-session stream errors mean the link is gone |
//! | [`Error::NotConnected`] | Returned synchronously to the caller | Precondition violation, never fatal |
//! | [`Error::AlreadyConnected`] | Returned synchronously to the caller | Call `disconnect()` first for teardown-and-retry |
//! | [`Error::Closed`] | Do not retry on the same transport | A closed transport is never reused |
//! | [`Error::Cancelled`] | Do not retry | The caller asked for the stop |
//! | [`Error::InvalidConfig`] | Do not retry | Fix configuration and restart |
//!
//! Malformed protocol frames are intentionally absent from this taxonomy:
//! they are dropped inside the reader loop and never surface as errors.

use thiserror::Error;

use crate::link::ConnectionState;

/// Errors that can occur when communicating with a feeder.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A connection attempt failed.
    #[error("connection failed: {reason}")]
    ConnectionFailed {
        /// The peer address that was being dialed, if known.
        address: Option<String>,
        /// The structured reason for the failure.
        reason: ConnectionFailureReason,
    },

    /// Operation attempted while the link is not connected.
    #[error("not connected to feeder")]
    NotConnected,

    /// `connect()` called on a link that already owns a connection attempt.
    #[error("link is already {state}")]
    AlreadyConnected {
        /// The state the link was in when the call was rejected.
        state: ConnectionState,
    },

    /// The transport was closed underneath the operation.
    #[error("transport closed")]
    Closed,

    /// Operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error on an established transport.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Structured reasons for connection failures.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new reasons
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionFailureReason {
    /// Peer is unreachable (out of range, powered off, no route).
    Unreachable,
    /// Peer actively refused the connection.
    Refused,
    /// Connection attempt timed out.
    Timeout,
    /// Transport-level error.
    Transport(String),
    /// Other/unknown error.
    Other(String),
}

impl ConnectionFailureReason {
    /// Derive a structured reason from an I/O error.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::ConnectionRefused => Self::Refused,
            ErrorKind::TimedOut => Self::Timeout,
            ErrorKind::HostUnreachable | ErrorKind::NetworkUnreachable | ErrorKind::NotFound => {
                Self::Unreachable
            }
            _ => Self::Transport(err.to_string()),
        }
    }
}

impl std::fmt::Display for ConnectionFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => write!(f, "peer unreachable"),
            Self::Refused => write!(f, "connection refused by peer"),
            Self::Timeout => write!(f, "connection timed out"),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error {
    /// Create a connection failure with a structured reason.
    pub fn connection_failed(address: Option<String>, reason: ConnectionFailureReason) -> Self {
        Self::ConnectionFailed { address, reason }
    }

    /// Create a connection failure with a string reason.
    ///
    /// Convenience wrapper placing the string in [`ConnectionFailureReason::Other`].
    pub fn connection_failed_str(address: Option<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            address,
            reason: ConnectionFailureReason::Other(reason.into()),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether another attempt at the same operation could plausibly succeed.
    ///
    /// The connect supervisor consults this before scheduling a retry, so
    /// configuration mistakes and deliberate cancellations fail fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ConnectionFailed { .. } => true,
            Error::Io(_) => true,
            Error::NotConnected => false,
            Error::AlreadyConnected { .. } => false,
            Error::Closed => false,
            Error::Cancelled => false,
            Error::InvalidConfig(_) => false,
        }
    }
}

/// Result type alias using feedflow-link's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::connection_failed(
            Some("AA:BB:CC:DD:EE:FF".to_string()),
            ConnectionFailureReason::Timeout,
        );
        assert_eq!(err.to_string(), "connection failed: connection timed out");

        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "not connected to feeder");

        let err = Error::AlreadyConnected {
            state: ConnectionState::Connecting,
        };
        assert_eq!(err.to_string(), "link is already connecting");
    }

    #[test]
    fn reason_from_io() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "nope");
        assert_eq!(
            ConnectionFailureReason::from_io(&refused),
            ConnectionFailureReason::Refused
        );

        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert_eq!(
            ConnectionFailureReason::from_io(&timeout),
            ConnectionFailureReason::Timeout
        );
    }

    #[test]
    fn retryability() {
        assert!(
            Error::connection_failed(None, ConnectionFailureReason::Unreachable).is_retryable()
        );
        assert!(Error::Io(std::io::Error::other("reset")).is_retryable());
        assert!(!Error::NotConnected.is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::invalid_config("bad").is_retryable());
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("pipe gone"));
    }
}
