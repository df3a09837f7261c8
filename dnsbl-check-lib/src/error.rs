//! Error handling for blacklist lookups.
//!
//! This module defines the error type shared by providers, the lookup
//! engine, input parsing and configuration loading. Per-pair failures are
//! carried inside [`crate::OutcomeStatus`] as data; only input and
//! configuration errors ever reach the caller as `Err`.

use std::fmt;
use std::time::Duration;

/// Main error type for DNSBL checking operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DnsblError {
    /// The listing check against a blacklist zone failed
    QueryFailed {
        zone: String,
        address: String,
        message: String,
    },

    /// The address is listed but its reason could not be fetched
    ReasonFailed {
        zone: String,
        address: String,
        message: String,
    },

    /// The address is not an IPv4 or IPv6 literal
    InvalidAddress { address: String, reason: String },

    /// A DNS query did not answer in time
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// Provider list or configuration file could not be read
    FileError { path: String, message: String },

    /// Anything that does not fit above, including panicking providers
    Internal { message: String },
}

impl DnsblError {
    /// Create a new listing-check failure.
    pub fn query_failed<Z: Into<String>, A: Into<String>, M: Into<String>>(
        zone: Z,
        address: A,
        message: M,
    ) -> Self {
        Self::QueryFailed {
            zone: zone.into(),
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a new reason-fetch failure.
    pub fn reason_failed<Z: Into<String>, A: Into<String>, M: Into<String>>(
        zone: Z,
        address: A,
        message: M,
    ) -> Self {
        Self::ReasonFailed {
            zone: zone.into(),
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid address error.
    pub fn invalid_address<A: Into<String>, R: Into<String>>(address: A, reason: R) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
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

    /// Check if this error suggests the query could succeed on a later run.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::QueryFailed { .. } | Self::ReasonFailed { .. }
        )
    }
}

impl fmt::Display for DnsblError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryFailed {
                zone,
                address,
                message,
            } => write!(f, "lookup of {} in {} failed: {}", address, zone, message),
            Self::ReasonFailed {
                zone,
                address,
                message,
            } => write!(
                f,
                "reason lookup of {} in {} failed: {}",
                address, zone, message
            ),
            Self::InvalidAddress { address, reason } => {
                write!(f, "invalid address '{}': {}", address, reason)
            }
            Self::Timeout {
                operation,
                duration,
            } => write!(f, "timeout after {:?} during {}", duration, operation),
            Self::ConfigError { message } => write!(f, "configuration error: {}", message),
            Self::FileError { path, message } => write!(f, "file error at '{}': {}", path, message),
            Self::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for DnsblError {}

impl From<std::io::Error> for DnsblError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for DnsblError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
