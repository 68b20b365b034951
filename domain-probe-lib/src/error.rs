//! Error handling for domain probing runs.
//!
//! Per-domain failures (`http error`, `io error`) are ordinary
//! classification results and never show up here. This type covers the
//! conditions that abort a whole run: unreadable input, unwritable output,
//! bad configuration and broken internals.

use std::fmt;

/// Main error type for domain probing operations.
#[derive(Debug, Clone)]
pub enum DomainProbeError {
    /// File I/O errors when reading domain lists or writing results
    FileError {
        path: String,
        message: String,
    },

    /// Malformed delimited input or failed CSV serialization
    CsvError {
        message: String,
    },

    /// Configuration errors (invalid settings, unparsable files, etc.)
    ConfigError {
        message: String,
    },

    /// HTTP client could not be constructed
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl DomainProbeError {
    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::CsvError { message } => {
                write!(f, "CSV error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainProbeError {}

impl From<reqwest::Error> for DomainProbeError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_with_source("HTTP client error", err.to_string())
    }
}

impl From<csv::Error> for DomainProbeError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DomainProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}
