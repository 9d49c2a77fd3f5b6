//! The typed output tree node and its accessor layer.
//!
//! An [`OutputNode`] owns one text block and the labels of every skill
//! that ran against it. Lookups distinguish three cases explicitly:
//!
//! - the skill ran and produced labels → `Ok` with a non-empty slice
//! - the skill ran and produced nothing → `Ok` with an empty slice
//! - the skill never ran on this branch → [`Error::LabelNotFound`]
//!
//! The third case is never collapsed into an empty default; callers that
//! probe for a skill that was not in the pipeline get an error naming
//! what is actually available.

use crate::errors::{Error, Result};
use crate::label::Label;
use crate::skills::SkillDescriptor;

/// Labels of one skill that ran against this node's text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LabelEntry {
    pub(crate) skill: SkillDescriptor,
    pub(crate) labels: Vec<Label>,
}

/// One node of the result tree.
///
/// The root node holds the original input text; each child holds the text
/// a Generator skill produced, keyed by that generator's name.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    text: String,
    entries: Vec<LabelEntry>,
    children: Vec<(SkillDescriptor, OutputNode)>,
}

impl OutputNode {
    pub(crate) fn new(text: String) -> Self {
        Self {
            text,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn push_entry(&mut self, skill: SkillDescriptor, labels: Vec<Label>) {
        self.entries.push(LabelEntry { skill, labels });
    }

    pub(crate) fn push_child(&mut self, skill: SkillDescriptor, child: OutputNode) {
        self.children.push((skill, child));
    }

    /// The text this node's labels refer to.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Labels of the skill answering to `name` on this node.
    ///
    /// `name` matches the skill's service name, its label vocabulary, or
    /// its output field, exactly. An empty slice means the skill ran and
    /// found nothing; a skill that never ran here is an error.
    pub fn labels(&self, name: &str) -> Result<&[Label]> {
        self.entries
            .iter()
            .find(|e| e.skill.answers_to(name))
            .map(|e| e.labels.as_slice())
            .ok_or_else(|| self.not_found(name))
    }

    /// The child node produced by the Generator skill answering to
    /// `name`.
    pub fn branch(&self, name: &str) -> Result<&OutputNode> {
        self.children
            .iter()
            .find(|(skill, _)| skill.answers_to(name))
            .map(|(_, node)| node)
            .ok_or_else(|| self.not_found(name))
    }

    /// Names of the skills that ran against this node's text, in
    /// pipeline order.
    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.skill.name.as_str())
    }

    /// Child nodes with the generator name that produced each, in
    /// pipeline order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &OutputNode)> {
        self.children
            .iter()
            .map(|(skill, node)| (skill.name.as_str(), node))
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Length of the longest child chain below this node, in edges.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|(_, c)| 1 + c.depth())
            .max()
            .unwrap_or(0)
    }

    fn not_found(&self, name: &str) -> Error {
        let mut available: Vec<&str> = self.skill_names().collect();
        available.extend(self.children.iter().map(|(s, _)| s.name.as_str()));
        Error::label_not_found(
            name,
            if available.is_empty() {
                "no skills ran on this branch".to_string()
            } else {
                format!(
                    "skill did not run on this branch (available: {})",
                    available.join(", ")
                )
            },
        )
    }
}
