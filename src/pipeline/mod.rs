//! Pipeline specification, validation, and execution.
//!
//! A pipeline is an ordered list of [`SkillDescriptor`](crate::skills::SkillDescriptor)s.
//! This module provides declarative construction, structural validation,
//! and the runner that drives a validated spec against a transport.
//!
//! ## Submodules
//!
//! - [`spec`] — [`PipelineSpec`] and its builder, plus step arithmetic
//! - [`validation`] — rule-based structural validation
//! - [`errors`] — structured spec errors with stable codes
//! - [`runner`] — executes a spec over an injected transport

pub mod errors;
pub mod runner;
pub mod spec;
pub mod validation;

pub use errors::{ErrorCode, SpecError};
pub use runner::PipelineRunner;
pub use spec::{PipelineBuilder, PipelineSpec};
pub use validation::{
    Severity, ValidationDiagnostic, ValidationEngine, ValidationReport, ValidationRule,
};
