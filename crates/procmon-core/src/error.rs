//! Error types for procmon operations.
//!
//! This module defines [`ProcmonError`], the error enum shared across the
//! procmon workspace. Errors here are designed for visibility: malformed
//! input is reported and dropped rather than silently swallowed, and
//! nothing in the UI path is allowed to panic.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ProcmonError`].
pub type Result<T> = std::result::Result<T, ProcmonError>;

/// Error type for all procmon operations.
#[derive(Debug, Error)]
pub enum ProcmonError {
    // =========================================================================
    // Event payload errors
    // =========================================================================
    /// An event payload failed to decode into a process record.
    ///
    /// Non-fatal: the feed logs the error and drops the event.
    #[error("Malformed payload on channel {channel}: {message}")]
    PayloadDecode {
        channel: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Terminal setup or teardown failed
    #[error("Terminal error during {operation}")]
    Terminal {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Catch-all for invariant violations that should never happen.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProcmonError {
    /// Build a payload decode error from a serde failure.
    pub fn payload_decode(channel: impl Into<String>, source: serde_json::Error) -> Self {
        Self::PayloadDecode {
            channel: channel.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Build a terminal error with operation context.
    pub fn terminal(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Terminal {
            operation: operation.into(),
            source,
        }
    }

    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ProcmonError {
    fn from(source: std::io::Error) -> Self {
        Self::Terminal {
            operation: "I/O".to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_decode_message() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ProcmonError::payload_decode("process_log", source);
        let msg = err.to_string();
        assert!(msg.contains("process_log"), "message was: {msg}");
        assert!(msg.starts_with("Malformed payload"));
    }

    #[test]
    fn test_terminal_error_context() {
        let io = std::io::Error::other("boom");
        let err = ProcmonError::terminal("raw mode", io);
        assert!(err.to_string().contains("raw mode"));
    }

    #[test]
    fn test_internal_error() {
        let err = ProcmonError::internal("broken invariant");
        assert_eq!(err.to_string(), "Internal error: broken invariant");
    }
}
