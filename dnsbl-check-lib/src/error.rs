//! Error handling for DNSBL checking operations.
//!
//! Only failures that happen before dispatch (bad input, bad configuration)
//! or after it (formatting, writing) surface as `Err` at the run level.
//! Per-address and per-lookup failures are contained inside the probe engine.

use thiserror::Error;

/// Main error type for DNSBL checking operations.
#[derive(Debug, Clone, Error)]
pub enum DnsblCheckError {
    /// Input is not a well-formed IPv4 address
    #[error("Invalid IP address: {input}")]
    InvalidAddress { input: String },

    /// Input contains a `/` but is not valid CIDR syntax
    #[error("Invalid subnet format: {input}")]
    InvalidSubnet { input: String },

    /// CIDR parsed, but is not an IPv4 /24
    #[error("Unsupported prefix length /{prefix}: only /24 subnets are supported")]
    UnsupportedPrefixLength { prefix: u8 },

    /// An address reached the query name builder without four octets
    #[error("Malformed address '{address}': expected four dot-separated octets")]
    MalformedAddress { address: String },

    /// Configuration errors (invalid settings, unparsable file, etc.)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File I/O errors when reading configuration or writing reports
    #[error("File error at '{path}': {message}")]
    FileError { path: String, message: String },

    /// JSON/TOML serialization failures
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DnsblCheckError {
    /// Create a new invalid address error.
    pub fn invalid_address<I: Into<String>>(input: I) -> Self {
        Self::InvalidAddress {
            input: input.into(),
        }
    }

    /// Create a new invalid subnet error.
    pub fn invalid_subnet<I: Into<String>>(input: I) -> Self {
        Self::InvalidSubnet {
            input: input.into(),
        }
    }

    /// Create a new malformed address error.
    pub fn malformed_address<A: Into<String>>(address: A) -> Self {
        Self::MalformedAddress {
            address: address.into(),
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
}

impl From<serde_json::Error> for DnsblCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for DnsblCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

impl From<toml::ser::Error> for DnsblCheckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::SerializationError {
            message: format!("TOML serialization failed: {}", err),
        }
    }
}

impl From<std::io::Error> for DnsblCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}
