//! Error handling for WHOIS resolution.
//!
//! This module defines the error type shared by the transport, the resolver,
//! the record parser and configuration loading. Transport errors keep the
//! server they came from so callers can tell which hop failed.

use std::fmt;
use std::time::Duration;

/// Main error type for WHOIS operations.
#[derive(Debug, Clone, PartialEq)]
pub enum WhoisError {
    /// Empty or unusable query subject, detected before any network I/O
    InvalidSubject { subject: String, reason: String },

    /// The connection could not be established or was lost mid-exchange
    ConnectionError { server: String, message: String },

    /// The query line could not be fully transmitted
    WriteError { server: String, message: String },

    /// The deadline elapsed during connect, write or read
    Timeout {
        server: String,
        operation: String,
        duration: Duration,
    },

    /// The caller's cancellation token fired
    Cancelled { server: String },

    /// Raw text could not be turned into a structured record
    ParseError { message: String },

    /// Invalid configuration values
    ConfigError { message: String },

    /// Configuration file I/O errors
    FileError { path: String, message: String },

    /// Anything that doesn't fit the categories above
    Internal { message: String },
}

impl WhoisError {
    /// Create a new invalid subject error.
    pub fn invalid_subject<S: Into<String>, R: Into<String>>(subject: S, reason: R) -> Self {
        Self::InvalidSubject {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a new connection error.
    pub fn connection<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::ConnectionError {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new write error.
    pub fn write<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::WriteError {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>, O: Into<String>>(
        server: S,
        operation: O,
        duration: Duration,
    ) -> Self {
        Self::Timeout {
            server: server.into(),
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new cancellation error.
    pub fn cancelled<S: Into<String>>(server: S) -> Self {
        Self::Cancelled {
            server: server.into(),
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error suggests the lookup could succeed on a retry.
    ///
    /// The engine never retries on its own; this is for callers that own
    /// retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError { .. } | Self::Timeout { .. })
    }

    /// The server a transport-level error refers to, if any.
    pub fn server(&self) -> Option<&str> {
        match self {
            Self::ConnectionError { server, .. }
            | Self::WriteError { server, .. }
            | Self::Timeout { server, .. }
            | Self::Cancelled { server } => Some(server),
            _ => None,
        }
    }
}

impl fmt::Display for WhoisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSubject { subject, reason } => {
                if subject.is_empty() {
                    write!(f, "Invalid query: {}", reason)
                } else {
                    write!(f, "Invalid query '{}': {}", subject, reason)
                }
            }
            Self::ConnectionError { server, message } => {
                write!(f, "Connection error with {}: {}", server, message)
            }
            Self::WriteError { server, message } => {
                write!(f, "Failed to send query to {}: {}", server, message)
            }
            Self::Timeout {
                server,
                operation,
                duration,
            } => {
                write!(
                    f,
                    "Timeout after {:?} during {} with {}",
                    duration, operation, server
                )
            }
            Self::Cancelled { server } => {
                write!(f, "Query to {} was cancelled", server)
            }
            Self::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for WhoisError {}

impl From<serde_json::Error> for WhoisError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON encoding failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for WhoisError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_mentions_timeout() {
        let err = WhoisError::timeout("127.0.0.1:4343", "read", Duration::from_secs(1));
        let msg = err.to_string().to_lowercase();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("127.0.0.1:4343"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(WhoisError::connection("a", "refused").is_retryable());
        assert!(WhoisError::timeout("a", "connect", Duration::from_secs(1)).is_retryable());
        assert!(!WhoisError::write("a", "broken pipe").is_retryable());
        assert!(!WhoisError::invalid_subject("", "empty").is_retryable());
        assert!(!WhoisError::parse("nope").is_retryable());
    }

    #[test]
    fn test_server_accessor() {
        assert_eq!(
            WhoisError::connection("whois.iana.org:43", "x").server(),
            Some("whois.iana.org:43")
        );
        assert_eq!(WhoisError::parse("x").server(), None);
    }

    #[test]
    fn test_invalid_subject_display() {
        let err = WhoisError::invalid_subject("", "query subject cannot be empty");
        assert_eq!(err.to_string(), "Invalid query: query subject cannot be empty");
    }
}
