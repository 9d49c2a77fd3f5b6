//! Structured errors for pipeline spec validation.
//!
//! [`SpecError`] describes a build-time problem found while validating a
//! pipeline spec (empty pipeline, bad parameter values, unknown skills).
//! Each error carries a stable [`ErrorCode`] for programmatic matching, a
//! JSON pointer `path` locating the problem in the spec, a human-readable
//! `message`, and an optional `hint` suggesting a fix.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes for spec validation failures.
///
/// Codes serialize in snake_case and never change meaning across releases,
/// so callers can match on them programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The pipeline contains no skills.
    EmptyPipeline,
    /// A parameter value is outside its documented range.
    InvalidValue,
    /// A required parameter is absent.
    MissingParam,
    /// A parameter name is not recognized for the skill.
    UnknownParam,
    /// Two steps form a combination that cannot produce useful output.
    InvalidCombo,
    /// A step repeats earlier work without new input text in between.
    RedundantStep,
    /// A step is placed where it likely does not do what the author
    /// intended.
    MisplacedStep,
    /// Catch-all for a spec that failed validation.
    ValidationFailed,
}

impl ErrorCode {
    /// The snake_case wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPipeline => "empty_pipeline",
            Self::InvalidValue => "invalid_value",
            Self::MissingParam => "missing_param",
            Self::UnknownParam => "unknown_param",
            Self::InvalidCombo => "invalid_combo",
            Self::RedundantStep => "redundant_step",
            Self::MisplacedStep => "misplaced_step",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation error found in a pipeline spec before any request is built.
///
/// # Display format
///
/// ```text
/// [empty_pipeline] /skills: pipeline must contain at least one skill
/// ```
///
/// # JSON format
///
/// ```json
/// {
///   "code": "invalid_value",
///   "path": "/skills/0/params/max_length",
///   "message": "max_length must be a positive integer",
///   "hint": "Use a value >= 1"
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {path}: {message}")]
pub struct SpecError {
    /// Stable error code for programmatic matching.
    pub code: ErrorCode,

    /// JSON pointer into the spec identifying the problematic location.
    ///
    /// Examples: `"/skills/2/params/max_length"`, `"/skills"`, `""` (root).
    pub path: String,

    /// Human-readable description of the problem.
    pub message: String,

    /// Optional suggestion for how to fix the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SpecError {
    /// Create a new spec error.
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint suggesting how to fix the problem.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::new(
            ErrorCode::EmptyPipeline,
            "/skills",
            "pipeline must contain at least one skill",
        );
        assert_eq!(
            err.to_string(),
            "[empty_pipeline] /skills: pipeline must contain at least one skill"
        );
    }

    #[test]
    fn test_spec_error_with_hint() {
        let err = SpecError::new(
            ErrorCode::InvalidValue,
            "/skills/0/params/max_length",
            "max_length must be a positive integer",
        )
        .with_hint("Use a value >= 1");

        assert_eq!(err.hint.as_deref(), Some("Use a value >= 1"));
    }

    #[test]
    fn test_spec_error_serde_roundtrip() {
        let err = SpecError::new(
            ErrorCode::MissingParam,
            "/skills/1/params/min_length",
            "summarize requires min_length",
        )
        .with_hint("Pass min_length when constructing the skill");

        let json = serde_json::to_string(&err).unwrap();
        let back: SpecError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_spec_error_json_format() {
        let err = SpecError::new(
            ErrorCode::UnknownParam,
            "/skills/0/params/speling",
            "Unknown parameter 'speling'",
        );

        let value: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "unknown_param");
        assert_eq!(value["path"], "/skills/0/params/speling");
        assert_eq!(value["message"], "Unknown parameter 'speling'");
        // hint is None → should be absent from JSON
        assert!(value.get("hint").is_none());
    }

    #[test]
    fn test_spec_error_json_with_hint() {
        let err = SpecError::new(
            ErrorCode::InvalidCombo,
            "/skills",
            "anonymize output feeds a transcription enhancer",
        )
        .with_hint("Run enhance_transcription before anonymize");

        let value: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["hint"], "Run enhance_transcription before anonymize");
    }

    #[test]
    fn test_spec_error_is_std_error() {
        let err = SpecError::new(ErrorCode::ValidationFailed, "", "spec validation failed");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_error_code_as_str_matches_serde() {
        for code in [
            ErrorCode::EmptyPipeline,
            ErrorCode::InvalidValue,
            ErrorCode::MissingParam,
            ErrorCode::UnknownParam,
            ErrorCode::InvalidCombo,
            ErrorCode::RedundantStep,
            ErrorCode::MisplacedStep,
            ErrorCode::ValidationFailed,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }
}
