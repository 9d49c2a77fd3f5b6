//! Skill descriptors and the built-in skill catalog.
//!
//! A [`SkillDescriptor`] is the immutable configuration for one pipeline
//! step: the skill's service name, its parameters, and its
//! [`SkillKind`]. Descriptors are pure value objects with structural
//! equality and hashing, so a pipeline builder may deduplicate or cache
//! them freely.
//!
//! The free functions in this module construct the service's built-in
//! skills with their parameters range-checked up front; arbitrary skills
//! can be described through [`SkillDescriptor::analyzer`] and
//! [`SkillDescriptor::generator`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::pipeline::errors::{ErrorCode, SpecError};

/// How a skill transforms its branch of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Annotates the current text with labels; the text flows through
    /// unchanged.
    Analyzer,
    /// Produces new text; every later skill runs against that text until
    /// the next generator.
    Generator,
}

impl SkillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyzer => "analyzer",
            Self::Generator => "generator",
        }
    }
}

/// A scalar skill parameter.
///
/// Parameters stay scalar so descriptors keep structural `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Immutable configuration for one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Service name of the skill (`"summarize"`, `"keywords"`, ...).
    pub name: String,

    /// Analyzer or Generator. Determines result-tree branching.
    pub kind: SkillKind,

    /// Label vocabulary this skill emits (`"keyword"`, `"sentiment"`).
    /// Empty for generators that only produce text.
    #[serde(default)]
    pub label_type: String,

    /// Field name the service uses for this skill's output, also accepted
    /// by the accessor layer as an alias for the skill name.
    #[serde(default)]
    pub output_field: String,

    /// Skill parameters, ordered by name for stable hashing and
    /// serialization.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

impl SkillDescriptor {
    /// Describe a custom Analyzer skill.
    pub fn analyzer(name: impl Into<String>, label_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output_field: name.clone(),
            name,
            kind: SkillKind::Analyzer,
            label_type: label_type.into(),
            params: BTreeMap::new(),
        }
    }

    /// Describe a custom Generator skill.
    pub fn generator(name: impl Into<String>, output_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SkillKind::Generator,
            label_type: String::new(),
            output_field: output_field.into(),
            params: BTreeMap::new(),
        }
    }

    /// Set a parameter. Intended for custom skills; the built-in
    /// constructors validate their own parameters.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the label vocabulary.
    pub fn with_label_type(mut self, label_type: impl Into<String>) -> Self {
        self.label_type = label_type.into();
        self
    }

    /// Whether this skill produces a new text branch.
    pub fn is_generator(&self) -> bool {
        self.kind == SkillKind::Generator
    }

    /// Whether `name` refers to this skill: exact match on the skill
    /// name, its label vocabulary, or its output field.
    pub fn answers_to(&self, name: &str) -> bool {
        name == self.name
            || (!self.label_type.is_empty() && name == self.label_type)
            || (!self.output_field.is_empty() && name == self.output_field)
    }
}

fn positive_int(
    params: &BTreeMap<String, ParamValue>,
    skill: &str,
    key: &str,
) -> std::result::Result<i64, SpecError> {
    let path = format!("/skills/{skill}/params/{key}");
    match params.get(key) {
        Some(value) => match value.as_int() {
            Some(v) if v >= 1 => Ok(v),
            _ => Err(SpecError::new(
                ErrorCode::InvalidValue,
                path,
                format!("{key} must be a positive integer"),
            )
            .with_hint("Use a value >= 1")),
        },
        None => Err(SpecError::new(
            ErrorCode::MissingParam,
            path,
            format!("{skill} requires {key}"),
        )),
    }
}

fn invalid(details: Vec<SpecError>) -> Error {
    Error::configuration_with("skill parameters failed validation", details)
}

// ─── Built-in catalog ───────────────────────────────────────────────────────

/// Abstractive summarization. Generator; output field `summary`.
///
/// Length bounds are in words and must satisfy
/// `1 <= min_length <= max_length`.
pub fn summarize(min_length: i64, max_length: i64) -> Result<SkillDescriptor> {
    let descriptor = SkillDescriptor {
        name: "summarize".into(),
        kind: SkillKind::Generator,
        label_type: "origin".into(),
        output_field: "summary".into(),
        params: BTreeMap::from([
            ("min_length".into(), ParamValue::Int(min_length)),
            ("max_length".into(), ParamValue::Int(max_length)),
        ]),
    };

    let mut details = Vec::new();
    let min = positive_int(&descriptor.params, "summarize", "min_length");
    let max = positive_int(&descriptor.params, "summarize", "max_length");
    if let Err(e) = &min {
        details.push(e.clone());
    }
    if let Err(e) = &max {
        details.push(e.clone());
    }
    if let (Ok(min), Ok(max)) = (min, max) {
        if min > max {
            details.push(
                SpecError::new(
                    ErrorCode::InvalidValue,
                    "/skills/summarize/params/min_length",
                    format!("min_length ({min}) exceeds max_length ({max})"),
                )
                .with_hint("Swap the bounds or widen max_length"),
            );
        }
    }
    if details.is_empty() {
        Ok(descriptor)
    } else {
        Err(invalid(details))
    }
}

/// Keyword extraction. Analyzer; labels of type `keyword`.
pub fn keywords() -> SkillDescriptor {
    SkillDescriptor::analyzer("keywords", "keyword")
}

/// Named entity recognition. Analyzer; labels of type `entity`.
pub fn entities() -> SkillDescriptor {
    SkillDescriptor::analyzer("entities", "entity")
}

/// Emotion detection. Analyzer; labels of type `emotion`.
pub fn emotions() -> SkillDescriptor {
    SkillDescriptor::analyzer("emotions", "emotion")
}

/// Sentence-level sentiment. Analyzer; labels of type `sentiment`.
pub fn sentiments() -> SkillDescriptor {
    SkillDescriptor::analyzer("sentiments", "sentiment")
}

/// Article topic classification. Analyzer; labels of type `topic`.
pub fn topics() -> SkillDescriptor {
    let mut skill = SkillDescriptor::analyzer("article-topics", "topic");
    skill.output_field = "topics".into();
    skill
}

/// Salient sentence highlighting. Analyzer; labels of type `highlight`.
pub fn highlights() -> SkillDescriptor {
    SkillDescriptor::analyzer("highlights", "highlight")
}

/// Action item detection for conversations. Analyzer; labels of type
/// `action-item`.
pub fn action_items() -> SkillDescriptor {
    let mut skill = SkillDescriptor::analyzer("action-items", "action-item");
    skill.output_field = "action_items".into();
    skill
}

/// PII removal. Generator; output field `anonymized`.
pub fn anonymize() -> SkillDescriptor {
    SkillDescriptor::generator("anonymize", "anonymized")
}

/// Transcription cleanup. Generator; output field `enhanced`, replacement
/// labels of type `replacement`.
pub fn enhance_transcription() -> SkillDescriptor {
    SkillDescriptor::generator("enhance", "enhanced").with_label_type("replacement")
}

/// Article body extraction from HTML. Generator; output field
/// `html_article`.
pub fn html_to_article() -> SkillDescriptor {
    SkillDescriptor::generator("html-extract-article", "html_article")
}
