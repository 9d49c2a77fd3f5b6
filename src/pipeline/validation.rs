//! Validation engine for skill pipelines.
//!
//! The engine runs all registered [`ValidationRule`]s against an ordered
//! list of [`SkillDescriptor`]s and collects every diagnostic into a
//! [`ValidationReport`]. It never short-circuits on the first error, so
//! users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use skillpipe::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&skills);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use serde::Serialize;

use super::errors::{ErrorCode, SpecError};
use crate::skills::SkillDescriptor;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding: an error or warning wrapping the
/// [`SpecError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: SpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: SpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: SpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects an ordered skill list and
/// returns zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads (e.g., in a long-lived validation engine).
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"non_empty"`).
    fn name(&self) -> &str;

    /// Inspect `skills` and return any findings.
    fn validate(&self, skills: &[SkillDescriptor]) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a skill list and collects all
/// diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(NonEmptyRule));
        engine.add_rule(Box::new(ParamRangeRule));
        engine.add_rule(Box::new(RedundantAnalyzerRule));
        engine.add_rule(Box::new(AnalyzerBeforeGeneratorRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all rules against `skills` and return the collected report.
    pub fn validate(&self, skills: &[SkillDescriptor]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(skills));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. pipeline must contain at least one skill ────────────────────────────

struct NonEmptyRule;

impl ValidationRule for NonEmptyRule {
    fn name(&self) -> &str {
        "non_empty"
    }

    fn validate(&self, skills: &[SkillDescriptor]) -> Vec<ValidationDiagnostic> {
        if skills.is_empty() {
            vec![ValidationDiagnostic::error(
                SpecError::new(
                    ErrorCode::EmptyPipeline,
                    "/skills",
                    "pipeline must contain at least one skill",
                )
                .with_hint("Add at least one skill before building"),
            )]
        } else {
            vec![]
        }
    }
}

// ─── 2. parameter ranges for documented parameters ──────────────────────────

// Re-checks ranges at build time so descriptors assembled by hand (or
// deserialized) go through the same gate as the catalog constructors.
struct ParamRangeRule;

impl ValidationRule for ParamRangeRule {
    fn name(&self) -> &str {
        "param_range"
    }

    fn validate(&self, skills: &[SkillDescriptor]) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        for (i, skill) in skills.iter().enumerate() {
            for key in ["min_length", "max_length"] {
                if let Some(value) = skill.params.get(key) {
                    if value.as_int().map(|v| v < 1).unwrap_or(true) {
                        out.push(ValidationDiagnostic::error(
                            SpecError::new(
                                ErrorCode::InvalidValue,
                                format!("/skills/{i}/params/{key}"),
                                format!("{key} must be a positive integer"),
                            )
                            .with_hint("Use a value >= 1"),
                        ));
                    }
                }
            }

            if let (Some(min), Some(max)) = (
                skill.params.get("min_length").and_then(|v| v.as_int()),
                skill.params.get("max_length").and_then(|v| v.as_int()),
            ) {
                if min >= 1 && max >= 1 && min > max {
                    out.push(ValidationDiagnostic::error(
                        SpecError::new(
                            ErrorCode::InvalidValue,
                            format!("/skills/{i}/params/min_length"),
                            format!("min_length ({min}) exceeds max_length ({max})"),
                        )
                        .with_hint("Swap the bounds or widen max_length"),
                    ));
                }
            }
        }

        out
    }
}

// ─── 3. repeated analyzer with no new text in between ───────────────────────

struct RedundantAnalyzerRule;

impl ValidationRule for RedundantAnalyzerRule {
    fn name(&self) -> &str {
        "redundant_analyzer"
    }

    fn validate(&self, skills: &[SkillDescriptor]) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        let mut seen_since_generator: Vec<&SkillDescriptor> = Vec::new();

        for (i, skill) in skills.iter().enumerate() {
            if skill.is_generator() {
                seen_since_generator.clear();
                continue;
            }
            if seen_since_generator.iter().any(|s| *s == skill) {
                out.push(ValidationDiagnostic::warning(
                    SpecError::new(
                        ErrorCode::RedundantStep,
                        format!("/skills/{i}"),
                        format!(
                            "'{}' already ran on this text; the repeat produces \
                             identical labels",
                            skill.name
                        ),
                    )
                    .with_hint("Remove the repeated step or insert a generator before it"),
                ));
            }
            seen_since_generator.push(skill);
        }

        out
    }
}

// ─── 4. analyzers ahead of the first generator ──────────────────────────────

// Advisory only. Running `[keywords, summarize]` attaches the keyword
// labels to the original input rather than the summary, which is a common
// surprise when the author meant the opposite order.
struct AnalyzerBeforeGeneratorRule;

impl ValidationRule for AnalyzerBeforeGeneratorRule {
    fn name(&self) -> &str {
        "analyzer_before_generator"
    }

    fn validate(&self, skills: &[SkillDescriptor]) -> Vec<ValidationDiagnostic> {
        let first_generator = match skills.iter().position(|s| s.is_generator()) {
            Some(pos) => pos,
            None => return vec![],
        };

        skills[..first_generator]
            .iter()
            .enumerate()
            .map(|(i, skill)| {
                ValidationDiagnostic::warning(
                    SpecError::new(
                        ErrorCode::MisplacedStep,
                        format!("/skills/{i}"),
                        format!(
                            "'{}' runs before '{}'; its labels attach to the \
                             original input, not the generated text",
                            skill.name, skills[first_generator].name
                        ),
                    )
                    .with_hint("Move the analyzer after the generator if it should \
                                annotate the generated text"),
                )
            })
            .collect()
    }
}
