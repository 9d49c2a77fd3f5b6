//! Request encoding.
//!
//! [`encode`] combines an [`InputPayload`] with a [`PipelineSpec`] into the
//! one logical request the transport collaborator sends to the service.
//! File contents are never inspected here; bytes travel as UTF-8 or base64
//! according to the classification the payload already carries, and the
//! sync-versus-job dispatch decision stays with the transport.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Error, Result};
use crate::input::{Encoding, InputPayload, Utterance};
use crate::pipeline::spec::PipelineSpec;
use crate::skills::{ParamValue, SkillDescriptor};

/// One pipeline step as the service expects it on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    /// Service name of the skill.
    pub skill: String,
    /// Skill parameters; always present, possibly empty.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl From<&SkillDescriptor> for StepEntry {
    fn from(skill: &SkillDescriptor) -> Self {
        Self {
            skill: skill.name.clone(),
            params: skill.params.clone(),
        }
    }
}

/// The encoded request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRequest {
    /// Input content: plain text, conversation JSON, or encoded file
    /// bytes.
    pub input: String,
    pub input_type: String,
    pub content_type: String,
    pub encoding: String,
    /// Pipeline steps in execution order.
    pub steps: Vec<StepEntry>,
}

impl EncodedRequest {
    /// Serialize to the JSON body handed to the transport.
    pub fn to_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Serialize)]
struct ConversationBody<'a> {
    utterances: &'a [Utterance],
}

/// Encode one input and one pipeline into a request.
pub fn encode(payload: &InputPayload, spec: &PipelineSpec) -> Result<EncodedRequest> {
    let steps = spec.skills().iter().map(StepEntry::from).collect();

    let (input, content_type, encoding) = match payload {
        InputPayload::Text(text) => (text.clone(), "text/plain".to_string(), Encoding::Utf8),
        InputPayload::Conversation(utterances) => (
            serde_json::to_string(&ConversationBody { utterances })?,
            "application/json".to_string(),
            Encoding::Utf8,
        ),
        InputPayload::File { bytes, content, .. } => {
            let input = match content.encoding {
                Encoding::Utf8 => String::from_utf8(bytes.clone()).map_err(|_| {
                    Error::unsupported_input(format!(
                        "file declared as {} is not valid UTF-8",
                        content.mime
                    ))
                })?,
                Encoding::Base64 => BASE64.encode(bytes),
            };
            (input, content.mime.to_string(), content.encoding)
        }
    };

    Ok(EncodedRequest {
        input,
        input_type: payload.input_type().to_string(),
        content_type,
        encoding: encoding.as_str().to_string(),
        steps,
    })
}
