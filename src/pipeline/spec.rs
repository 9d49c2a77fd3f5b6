//! Pipeline specification types.
//!
//! A [`PipelineSpec`] is a validated, immutable, ordered list of
//! [`SkillDescriptor`]s. Order is semantically significant: every
//! Generator skill re-roots all later skills onto its generated text, so
//! `[keywords, summarize]` and `[summarize, keywords]` produce different
//! result trees for the same input.
//!
//! Specs are built once through [`PipelineSpec::builder`] and are then
//! freely shareable: they hold no mutable state and are reusable across
//! any number of runs and threads.

use serde::{Deserialize, Serialize};

use super::validation::{ValidationEngine, ValidationReport};
use crate::errors::{Error, Result};
use crate::skills::SkillDescriptor;

/// A validated, ordered skill pipeline.
///
/// Step ids are 1-based positions in the skill list; step id 0 always
/// refers to the original input in service responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    skills: Vec<SkillDescriptor>,
}

impl PipelineSpec {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Build directly from a skill list, running full validation.
    pub fn from_skills(skills: Vec<SkillDescriptor>) -> Result<Self> {
        PipelineBuilder { skills }.build()
    }

    /// The skills in execution order.
    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Number of Generator skills, which equals the depth of the result
    /// tree below its root.
    pub fn generator_count(&self) -> usize {
        self.skills.iter().filter(|s| s.is_generator()).count()
    }

    /// The skill at 1-based `step_id`, or `None` for 0 (the original
    /// input) and out-of-range ids.
    pub fn skill_at_step(&self, step_id: usize) -> Option<&SkillDescriptor> {
        if step_id == 0 {
            return None;
        }
        self.skills.get(step_id - 1)
    }

    /// 1-based step ids of the Generator skills, in pipeline order.
    pub fn generator_steps(&self) -> Vec<usize> {
        self.skills
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_generator())
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// The Generator step whose output block is the parent of the block
    /// produced by `step_id`: the nearest Generator step strictly before
    /// it. `None` means the parent is the root (original input).
    pub fn parent_generator_step(&self, step_id: usize) -> Option<usize> {
        self.skills[..step_id.saturating_sub(1)]
            .iter()
            .rposition(|s| s.is_generator())
            .map(|i| i + 1)
    }

    /// The Analyzer skills that run against the text produced by
    /// Generator step `generator_step` (0 = the original input): every
    /// analyzer after that step and before the next Generator.
    pub fn branch_analyzers(&self, generator_step: usize) -> &[SkillDescriptor] {
        let start = generator_step; // index just past the generator
        let end = self.skills[start..]
            .iter()
            .position(|s| s.is_generator())
            .map(|p| start + p)
            .unwrap_or(self.skills.len());
        &self.skills[start..end]
    }

    /// Run the default validation rules and return every diagnostic.
    /// Useful for surfacing advisory warnings that `build()` only logs.
    pub fn validate(&self) -> ValidationReport {
        ValidationEngine::with_defaults().validate(&self.skills)
    }
}

/// Accumulates skills and validates them into a [`PipelineSpec`].
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    skills: Vec<SkillDescriptor>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one skill. Order of calls is execution order.
    pub fn skill(mut self, skill: SkillDescriptor) -> Self {
        self.skills.push(skill);
        self
    }

    /// Append several skills, preserving their order.
    pub fn skills(mut self, skills: impl IntoIterator<Item = SkillDescriptor>) -> Self {
        self.skills.extend(skills);
        self
    }

    /// Validate and freeze the pipeline.
    ///
    /// Errors collect every validation failure; warnings are logged at
    /// `warn` level and do not block the build.
    pub fn build(self) -> Result<PipelineSpec> {
        let report = ValidationEngine::with_defaults().validate(&self.skills);

        for warning in report.warnings() {
            tracing::warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
        }

        if report.has_errors() {
            return Err(Error::configuration_with(
                "pipeline spec failed validation",
                report.errors().cloned().collect(),
            ));
        }

        Ok(PipelineSpec {
            skills: self.skills,
        })
    }
}
