//! Label and span data model for service responses.
//!
//! Analyzer skills annotate a text block with [`Label`]s; every label points
//! back into the owning block's text through zero or more [`Span`]s. Span
//! offsets are code-point offsets into that block only, never into another
//! block's text.

use serde::{Deserialize, Serialize};

/// A half-open region of the owning block's text.
///
/// Offsets are counted in Unicode scalar values, matching the service's
/// code-point indexing, with `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First code point covered by the span.
    pub start: usize,
    /// One past the last code point covered by the span.
    pub end: usize,
    /// Section index for multi-section inputs (0 for plain text).
    #[serde(default)]
    pub section: usize,
    /// The covered text, as the service surfaced it.
    #[serde(default)]
    pub text: String,
}

impl Span {
    /// Create a span over section 0.
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            section: 0,
            text: text.into(),
        }
    }

    /// Check that the span's offsets are ordered and fit a text of
    /// `len` code points.
    pub fn fits(&self, len: usize) -> bool {
        self.start <= self.end && self.end <= len
    }
}

/// A scalar value attached to a label (a sentiment polarity, an emotion
/// intensity, a replacement string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl LabelValue {
    /// The string payload, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric payload, if this value is a number.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }
}

/// One annotation produced by an Analyzer skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Skill-type vocabulary this label belongs to (`"keyword"`,
    /// `"sentiment"`, `"entity"`, ...). Drives partitioning into the
    /// owning node's per-skill entries.
    #[serde(rename = "type")]
    pub label_type: String,

    /// Label name within the type (an entity's surface form, an emotion
    /// name). Absent for skills whose labels are anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Regions of the owning block's text this label covers, in service
    /// order.
    #[serde(default)]
    pub spans: Vec<Span>,

    /// Optional scalar payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LabelValue>,
}

impl Label {
    /// Create a label with no spans and no value.
    pub fn new(label_type: impl Into<String>) -> Self {
        Self {
            label_type: label_type.into(),
            name: None,
            spans: Vec::new(),
            value: None,
        }
    }

    /// Set the label name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Set the scalar payload.
    pub fn with_value(mut self, value: LabelValue) -> Self {
        self.value = Some(value);
        self
    }
}
