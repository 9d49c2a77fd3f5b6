//! Input payloads accepted by a pipeline run.
//!
//! Three shapes of input exist: plain text, a structured conversation, and
//! a raw file identified by its declared extension. File contents are never
//! parsed here except for `.srt` subtitle files, which are converted into a
//! conversation up front so the rest of the pipeline only ever sees the
//! three canonical tags.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::parsing;

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    #[serde(rename = "utterance")]
    pub text: String,
}

impl Utterance {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// How file bytes travel in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Utf8,
    Base64,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Base64 => "base64",
        }
    }
}

/// Content classification for a file payload, resolved from its declared
/// extension only. Bytes are never sniffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub mime: &'static str,
    pub encoding: Encoding,
}

/// Input for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPayload {
    /// Plain article text.
    Text(String),
    /// An ordered conversation transcript.
    Conversation(Vec<Utterance>),
    /// Raw file bytes plus the declared extension (without the dot).
    File {
        bytes: Vec<u8>,
        extension: String,
        content: ContentType,
    },
}

impl InputPayload {
    /// Wrap plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Wrap an utterance list.
    pub fn conversation(utterances: Vec<Utterance>) -> Self {
        Self::Conversation(utterances)
    }

    /// Classify file bytes by declared extension.
    ///
    /// `.srt` files are parsed into a conversation immediately; an
    /// extension outside the documented set fails with
    /// [`Error::UnsupportedInput`] before any network interaction.
    pub fn file(bytes: Vec<u8>, extension: impl Into<String>) -> Result<Self> {
        let extension = extension.into();
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();

        let content = match ext.as_str() {
            "json" => ContentType {
                mime: "application/json",
                encoding: Encoding::Utf8,
            },
            "txt" => ContentType {
                mime: "text/plain",
                encoding: Encoding::Utf8,
            },
            "html" => ContentType {
                mime: "text/html",
                encoding: Encoding::Utf8,
            },
            "srt" => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    Error::unsupported_input("srt file is not valid UTF-8")
                })?;
                return Ok(Self::Conversation(parsing::parse_srt(&text)?));
            }
            "jpg" | "jpeg" => ContentType {
                mime: "image/jpeg",
                encoding: Encoding::Base64,
            },
            "wav" => ContentType {
                mime: "audio/wav",
                encoding: Encoding::Base64,
            },
            "mp3" => ContentType {
                mime: "audio/mpeg",
                encoding: Encoding::Base64,
            },
            _ => {
                return Err(Error::unsupported_input(format!(
                    "unsupported file extension '{ext}'"
                )))
            }
        };

        Ok(Self::File {
            bytes,
            extension: ext,
            content,
        })
    }

    /// Wire value of the `input_type` field.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text(_) | Self::File { .. } => "article",
            Self::Conversation(_) => "conversation",
        }
    }
}
