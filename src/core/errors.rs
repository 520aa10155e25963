//! Error types for the jtbd-insight library.
//!
//! Errors only surface from configuration handling, lexicon compilation and
//! the low-level clustering primitives. The extraction and clustering entry
//! points convert every failure into a structurally valid output carrying a
//! note or warning instead of returning one of these.

use std::io;

use thiserror::Error;

/// Main result type for jtbd-insight operations.
pub type Result<T> = std::result::Result<T, JtbdError>;

/// Error type for all jtbd-insight operations.
#[derive(Error, Debug)]
pub enum JtbdError {
    /// I/O related errors (config files, input files)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Validation errors for configuration or input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cue lexicon construction errors
    #[error("Lexicon error for '{label}': {message}")]
    Lexicon {
        /// Theme or facet label whose definition is invalid
        label: String,
        /// Error description
        message: String,
    },

    /// Clustering primitive errors (invalid k, dimension mismatch)
    #[error("Clustering error: {message}")]
    Clustering {
        /// Error description
        message: String,
        /// Requested number of clusters, when relevant
        k: Option<usize>,
    },
}

impl JtbdError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new lexicon error
    pub fn lexicon(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lexicon {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create a new clustering error
    pub fn clustering(message: impl Into<String>, k: Option<usize>) -> Self {
        Self::Clustering {
            message: message.into(),
            k,
        }
    }
}

impl From<io::Error> for JtbdError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for JtbdError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for JtbdError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for JtbdError {
    fn from(err: regex::Error) -> Self {
        Self::lexicon("pattern", err.to_string())
    }
}
