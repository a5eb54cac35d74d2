// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for configuration resolution and plan validation.
//!
//! This module defines the error taxonomy for the crate. All errors use
//! `thiserror` and every one of them is fatal to the configuration load:
//! a partially wired service graph is worse than refusing to start, so
//! nothing is recovered locally and nothing is retried.

use thiserror::Error;

/// The main error type for configuration resolution and validation.
///
/// This enum covers every failure mode of the resolution pipeline, from
/// merging raw configuration through the pre-flight version gate. It is
/// marked `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use rediswire::domain::errors::WiringError;
///
/// fn resolve_parent() -> Result<(), WiringError> {
///     Err(WiringError::UnknownParent {
///         client: "sessions".to_string(),
///         parent: "master".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WiringError {
    /// A raw configuration value has the wrong shape for its position.
    #[error("malformed configuration at '{key}': {message}")]
    MalformedConfig {
        /// The configuration key at which the bad shape was found
        key: String,
        /// What was expected and what was found instead
        message: String,
    },

    /// A client config inherits from a name that is not resolved yet.
    ///
    /// Raised for undefined parents, forward references, and
    /// self-references alike: a parent must appear strictly before any
    /// client that extends it.
    #[error("client '{client}' inherits from unknown parent '{parent}', are you sure it's defined?")]
    UnknownParent {
        /// The client whose definition carries the parent reference
        client: String,
        /// The parent name that could not be resolved
        parent: String,
    },

    /// A configured endpoint reports a server version below the floor.
    #[error("redis server at '{endpoint}' reports version {reported}, minimum supported is {required}")]
    IncompatibleVersion {
        /// The endpoint that was probed
        endpoint: String,
        /// The version string the server reported
        reported: String,
        /// The minimum version this crate supports
        required: String,
    },

    /// A connection to a configured endpoint could not be established
    /// or broke during the version probe.
    #[error("connection to redis at '{endpoint}' failed: {message}")]
    Connection {
        /// The endpoint that was being contacted
        endpoint: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WiringError {
    /// Creates a [`WiringError::MalformedConfig`] for a key that was
    /// expected to hold a different shape of value.
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        WiringError::MalformedConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for resolution and validation operations.
pub type Result<T> = std::result::Result<T, WiringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_config_display() {
        let error =
            WiringError::malformed("clients.cache.port", "expected an integer, found a mapping");
        assert_eq!(
            error.to_string(),
            "malformed configuration at 'clients.cache.port': expected an integer, found a mapping"
        );
    }

    #[test]
    fn test_unknown_parent_display() {
        let error = WiringError::UnknownParent {
            client: "sessions".to_string(),
            parent: "master".to_string(),
        };
        assert!(error.to_string().contains("sessions"));
        assert!(error.to_string().contains("master"));
    }

    #[test]
    fn test_incompatible_version_display() {
        let error = WiringError::IncompatibleVersion {
            endpoint: "127.0.0.1:6379".to_string(),
            reported: "2.0.4".to_string(),
            required: "2.2.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "redis server at '127.0.0.1:6379' reports version 2.0.4, minimum supported is 2.2.0"
        );
    }

    #[test]
    fn test_connection_display() {
        let error = WiringError::Connection {
            endpoint: "/tmp/redis.sock".to_string(),
            message: "no such file or directory".to_string(),
            source: None,
        };
        assert!(error.to_string().contains("/tmp/redis.sock"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = WiringError::from(io_error);
        assert!(matches!(error, WiringError::IoError(_)));
    }
}
