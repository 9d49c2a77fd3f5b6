//! Error types for skillpipe
//!
//! This module defines the error types used throughout the library.
//! All errors are designed to be informative and actionable.

use thiserror::Error;

use crate::pipeline::errors::SpecError;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for skillpipe
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Skill parameters or pipeline composition failed validation.
    /// Raised at build time, before any request is encoded.
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        /// Structured diagnostics from spec validation, when available.
        details: Vec<SpecError>,
    },

    /// The input payload tag or declared file type is not recognized.
    /// Raised before any network interaction.
    #[error("Unsupported input: {message}")]
    UnsupportedInput { message: String },

    /// Opaque failure reported by the transport collaborator.
    /// Surfaced unchanged; retry policy belongs to the transport.
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// The service response violates the documented shape
    /// (dangling parent reference, missing root, out-of-bounds span).
    /// Never recovered silently.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// A skill name was looked up on an output node where that skill
    /// never ran. Distinct from "ran but found nothing" (empty slice).
    #[error("No labels for '{name}': {message}")]
    LabelNotFound { name: String, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Create a configuration error without structured details
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Create a configuration error carrying validation diagnostics
    pub fn configuration_with(message: impl Into<String>, details: Vec<SpecError>) -> Self {
        Self::Configuration {
            message: message.into(),
            details,
        }
    }

    /// Create an unsupported input error
    pub fn unsupported_input(message: impl Into<String>) -> Self {
        Self::UnsupportedInput {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a label lookup error
    pub fn label_not_found(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LabelNotFound {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error came from spec or descriptor validation
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this error indicates a response-shape violation
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }

    /// Check if this error came from an accessor lookup
    /// (the branch may still hold usable labels under other names)
    pub fn is_label_not_found(&self) -> bool {
        matches!(self, Self::LabelNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
