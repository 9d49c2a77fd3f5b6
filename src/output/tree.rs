//! Result tree construction.
//!
//! The service answers with a flat, ordered collection of text blocks;
//! each block names the pipeline step that generated its text
//! (`origin_step_id`, 0 for the original input). [`build_tree`] turns
//! that collection into the typed [`OutputNode`] tree whose shape mirrors
//! the pipeline's Generator branching.
//!
//! Every shape violation fails with
//! [`Error::MalformedResponse`](crate::errors::Error): a missing or
//! duplicated root, a block claiming an unknown or non-Generator step,
//! two blocks claiming the same step, a block whose parent block is
//! absent, or a span outside its block's text. Nothing is clamped or
//! silently reattached.

use rustc_hash::FxHashMap;

use crate::errors::{Error, Result};
use crate::output::node::OutputNode;
use crate::pipeline::spec::PipelineSpec;
use crate::skills::SkillDescriptor;
use crate::transport::{RawResponse, ResponseBlock};

/// Build the output tree for one response to one pipeline run.
pub fn build_tree(spec: &PipelineSpec, response: RawResponse) -> Result<OutputNode> {
    let mut root_block: Option<ResponseBlock> = None;
    let mut by_origin: FxHashMap<usize, ResponseBlock> = FxHashMap::default();

    for block in response.blocks {
        validate_spans(&block)?;

        if block.origin_step_id == 0 {
            if root_block.is_some() {
                return Err(Error::malformed_response(format!(
                    "block '{}' is a second root (origin_step_id 0)",
                    block.block_id
                )));
            }
            root_block = Some(block);
            continue;
        }

        let step = block.origin_step_id;
        let skill = spec.skill_at_step(step).ok_or_else(|| {
            Error::malformed_response(format!(
                "block '{}' references step {step}, but the pipeline has {} steps",
                block.block_id,
                spec.len()
            ))
        })?;
        if !skill.is_generator() {
            return Err(Error::malformed_response(format!(
                "block '{}' claims text from step {step} ('{}'), which is not a generator",
                block.block_id, skill.name
            )));
        }
        if !block.origin_step_name.is_empty() && block.origin_step_name != skill.name {
            return Err(Error::malformed_response(format!(
                "block '{}' names its origin '{}', but step {step} is '{}'",
                block.block_id, block.origin_step_name, skill.name
            )));
        }
        if let Some(previous) = by_origin.insert(step, block) {
            return Err(Error::malformed_response(format!(
                "blocks '{}' and '{}' both claim step {step}",
                previous.block_id,
                by_origin[&step].block_id
            )));
        }
    }

    let root_block = root_block
        .ok_or_else(|| Error::malformed_response("no root block (origin_step_id 0) present"))?;

    let root = attach(spec, 0, root_block, &mut by_origin)?;

    // anything left over has a broken ancestor chain
    if let Some((step, orphan)) = by_origin.drain().next() {
        return Err(Error::malformed_response(format!(
            "block '{}' (step {step}) has no parent block in the response",
            orphan.block_id
        )));
    }

    Ok(root)
}

/// Build the node for `block`, which was produced by Generator step
/// `step` (0 for the root), then recursively attach its children.
fn attach(
    spec: &PipelineSpec,
    step: usize,
    block: ResponseBlock,
    by_origin: &mut FxHashMap<usize, ResponseBlock>,
) -> Result<OutputNode> {
    let mut node = OutputNode::new(block.text);

    // the producing generator's own labels live on the node it produced
    let mut owners: Vec<&SkillDescriptor> = Vec::new();
    if let Some(producer) = spec.skill_at_step(step) {
        if !producer.label_type.is_empty() {
            owners.push(producer);
        }
    }
    owners.extend(spec.branch_analyzers(step));

    for skill in owners {
        let labels = block
            .labels
            .iter()
            .filter(|l| l.label_type == skill.label_type)
            .cloned()
            .collect();
        node.push_entry(skill.clone(), labels);
    }

    for (i, skill) in spec.skills().iter().enumerate() {
        if !skill.is_generator() {
            continue;
        }
        let generator_step = i + 1;
        if spec.parent_generator_step(generator_step).unwrap_or(0) != step {
            continue;
        }
        if let Some(child_block) = by_origin.remove(&generator_step) {
            let child = attach(spec, generator_step, child_block, by_origin)?;
            node.push_child(skill.clone(), child);
        }
    }

    Ok(node)
}

fn validate_spans(block: &ResponseBlock) -> Result<()> {
    let len = block.text.chars().count();
    for label in &block.labels {
        for span in &label.spans {
            if !span.fits(len) {
                return Err(Error::malformed_response(format!(
                    "span {}..{} of a '{}' label exceeds block '{}' ({len} chars)",
                    span.start, span.end, label.label_type, block.block_id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{Label, Span};
    use crate::skills;

    fn flat_spec() -> PipelineSpec {
        PipelineSpec::builder()
            .skill(skills::keywords())
            .skill(skills::sentiments())
            .build()
            .unwrap()
    }

    fn summary_spec() -> PipelineSpec {
        // [entities, summarize, keywords]
        PipelineSpec::builder()
            .skill(skills::entities())
            .skill(skills::summarize(5, 100).unwrap())
            .skill(skills::keywords())
            .build()
            .unwrap()
    }

    // ─── Flat pipelines ─────────────────────────────────────────────────

    #[test]
    fn test_zero_generators_single_node() {
        let response = RawResponse::new(vec![ResponseBlock::root("b0", "analyze this text.")
            .with_label(Label::new("keyword").with_name("analyze"))
            .with_label(Label::new("keyword").with_name("text"))
            .with_label(Label::new("sentiment").with_value(crate::label::LabelValue::Str(
                "NEU".into(),
            )))]);

        let tree = build_tree(&flat_spec(), response).unwrap();
        assert!(!tree.has_children());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.labels("keyword").unwrap().len(), 2);
        assert_eq!(tree.labels("sentiment").unwrap().len(), 1);
    }

    #[test]
    fn test_label_order_preserved() {
        let response = RawResponse::new(vec![ResponseBlock::root("b0", "t")
            .with_label(Label::new("keyword").with_name("first"))
            .with_label(Label::new("keyword").with_name("second"))
            .with_label(Label::new("keyword").with_name("third"))]);

        let tree = build_tree(&flat_spec(), response).unwrap();
        let names: Vec<_> = tree
            .labels("keyword")
            .unwrap()
            .iter()
            .map(|l| l.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_ran_but_empty_entry_exists() {
        // sentiments ran on the root branch but returned nothing
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "t").with_label(Label::new("keyword"))
        ]);
        let tree = build_tree(&flat_spec(), response).unwrap();
        assert!(tree.labels("sentiments").unwrap().is_empty());
    }

    // ─── Generator branching ────────────────────────────────────────────

    #[test]
    fn test_generator_produces_child() {
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "the original article text")
                .with_label(Label::new("entity").with_name("article")),
            ResponseBlock::generated("b1", 2, "summarize", "a short summary")
                .with_label(Label::new("keyword").with_name("summary")),
        ]);

        let tree = build_tree(&summary_spec(), response).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.labels("entities").unwrap().len(), 1);
        // keywords ran after the generator, so not on the root
        assert!(tree.labels("keywords").unwrap_err().is_label_not_found());

        let child = tree.branch("summarize").unwrap();
        assert_eq!(child.text(), "a short summary");
        assert_eq!(child.labels("keywords").unwrap().len(), 1);
        assert!(child.labels("entities").unwrap_err().is_label_not_found());
    }

    #[test]
    fn test_two_generator_chain_depth_two() {
        // [summarize, anonymize]
        let spec = PipelineSpec::builder()
            .skill(skills::summarize(5, 100).unwrap())
            .skill(skills::anonymize())
            .build()
            .unwrap();

        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b1", 1, "summarize", "summary"),
            ResponseBlock::generated("b2", 2, "anonymize", "anonymized summary"),
        ]);

        let tree = build_tree(&spec, response).unwrap();
        assert_eq!(tree.depth(), 2);
        let child = tree.branch("summarize").unwrap();
        let grandchild = child.branch("anonymize").unwrap();
        assert_eq!(grandchild.text(), "anonymized summary");
        assert!(!grandchild.has_children());
    }

    #[test]
    fn test_order_sensitivity() {
        // [keywords, summarize] puts keyword labels on the root;
        // [summarize, keywords] puts them on the child.
        let before = PipelineSpec::builder()
            .skill(skills::keywords())
            .skill(skills::summarize(5, 100).unwrap())
            .build()
            .unwrap();
        let after = PipelineSpec::builder()
            .skill(skills::summarize(5, 100).unwrap())
            .skill(skills::keywords())
            .build()
            .unwrap();

        let response_before = RawResponse::new(vec![
            ResponseBlock::root("b0", "input").with_label(Label::new("keyword")),
            ResponseBlock::generated("b1", 2, "summarize", "summary"),
        ]);
        let response_after = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b1", 1, "summarize", "summary")
                .with_label(Label::new("keyword")),
        ]);

        let tree_before = build_tree(&before, response_before).unwrap();
        assert_eq!(tree_before.labels("keyword").unwrap().len(), 1);
        assert!(tree_before
            .branch("summarize")
            .unwrap()
            .labels("keyword")
            .unwrap_err()
            .is_label_not_found());

        let tree_after = build_tree(&after, response_after).unwrap();
        assert!(tree_after.labels("keyword").unwrap_err().is_label_not_found());
        assert_eq!(
            tree_after
                .branch("summarize")
                .unwrap()
                .labels("keyword")
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_generator_own_labels_on_its_node() {
        // enhance emits replacement labels on the enhanced block
        let spec = PipelineSpec::builder()
            .skill(skills::enhance_transcription())
            .build()
            .unwrap();
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "umm so like hello"),
            ResponseBlock::generated("b1", 1, "enhance", "hello")
                .with_label(Label::new("replacement")),
        ]);

        let tree = build_tree(&spec, response).unwrap();
        let child = tree.branch("enhance").unwrap();
        assert_eq!(child.labels("replacement").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_generated_block_shortens_tree() {
        // the pipeline names a generator, the response has no block for
        // it; the tree simply ends at the root
        let response = RawResponse::new(vec![ResponseBlock::root("b0", "input")]);
        let tree = build_tree(&summary_spec(), response).unwrap();
        assert_eq!(tree.depth(), 0);
        assert!(tree.branch("summarize").unwrap_err().is_label_not_found());
    }

    // ─── Malformed responses ────────────────────────────────────────────

    #[test]
    fn test_missing_root_rejected() {
        let response = RawResponse::new(vec![ResponseBlock::generated(
            "b1",
            2,
            "summarize",
            "summary",
        )]);
        let err = build_tree(&summary_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "one"),
            ResponseBlock::root("b1", "two"),
        ]);
        let err = build_tree(&flat_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_unknown_step_rejected() {
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b9", 9, "", "text"),
        ]);
        let err = build_tree(&summary_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("step 9"));
    }

    #[test]
    fn test_analyzer_step_as_origin_rejected() {
        // step 1 of summary_spec is entities, an analyzer
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b1", 1, "entities", "text"),
        ]);
        let err = build_tree(&summary_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("not a generator"));
    }

    #[test]
    fn test_origin_name_mismatch_rejected() {
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b1", 2, "anonymize", "text"),
        ]);
        let err = build_tree(&summary_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_duplicate_origin_rejected() {
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b1", 2, "summarize", "one"),
            ResponseBlock::generated("b2", 2, "summarize", "two"),
        ]);
        let err = build_tree(&summary_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("both claim"));
    }

    #[test]
    fn test_dangling_parent_rejected_not_attached_to_root() {
        // [summarize, anonymize]: the anonymize block arrives but the
        // summarize block it descends from is missing
        let spec = PipelineSpec::builder()
            .skill(skills::summarize(5, 100).unwrap())
            .skill(skills::anonymize())
            .build()
            .unwrap();
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "input"),
            ResponseBlock::generated("b2", 2, "anonymize", "anonymized"),
        ]);

        let err = build_tree(&spec, response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("no parent block"));
    }

    #[test]
    fn test_span_out_of_bounds_rejected() {
        let response = RawResponse::new(vec![ResponseBlock::root("b0", "short")
            .with_label(Label::new("keyword").with_span(Span::new(0, 99, "short")))]);
        let err = build_tree(&flat_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("span"));
    }

    #[test]
    fn test_span_inverted_rejected() {
        let bad_span = Span {
            start: 4,
            end: 2,
            section: 0,
            text: String::new(),
        };
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "short").with_label(Label::new("keyword").with_span(bad_span))
        ]);
        let err = build_tree(&flat_spec(), response).unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_span_bounds_count_chars_not_bytes() {
        // 6 code points, 8 bytes
        let text = "caf\u{e9}s\u{e9}";
        let len = text.chars().count();
        let response = RawResponse::new(vec![ResponseBlock::root("b0", text)
            .with_label(Label::new("keyword").with_span(Span::new(0, len, text)))]);
        assert!(build_tree(&flat_spec(), response).is_ok());
    }

    #[test]
    fn test_unclaimed_label_types_ignored() {
        // a label type no pipeline skill emits is dropped, not an error
        let response = RawResponse::new(vec![
            ResponseBlock::root("b0", "t").with_label(Label::new("emotion"))
        ]);
        let tree = build_tree(&flat_spec(), response).unwrap();
        assert!(tree.labels("emotion").unwrap_err().is_label_not_found());
    }
}
