//! Conversation transcript parsers.
//!
//! Two textual transcript formats are recognized before a request is ever
//! encoded: SRT subtitle files and free-form "Speaker: text" conversation
//! dumps (with optional leading timestamps, as exported by chat and meeting
//! tools). Both parse into the [`Utterance`] list the service expects for
//! conversation input.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Error, Result};
use crate::input::Utterance;

fn srt_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+\r?\n\d{1,2}:\d{2}:\d{2}[,.]\d{1,3} --> \d{1,2}:\d{2}:\d{2}[,.]\d{1,3}")
            .unwrap()
    })
}

// "[3:07 PM, 3/15/2022]" style chat-export timestamps
fn bracket_timestamp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[?\s*([0-9:,\sPAM/]{4,23})(\]?)\s*").unwrap())
}

// "12:30", "1:02:45.5", optionally bracketed
fn clock_timestamp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[?\d{1,2}:\d{1,2}(:\d{1,2})?(\.\d*)?\]?\s*").unwrap())
}

fn caps_speaker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ A-Z_-]{3,20}$").unwrap())
}

fn any_case_speaker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ A-Za-z_-]{3,20}$").unwrap())
}

/// Parse an SRT subtitle file into a single-speaker conversation.
///
/// Fails with [`Error::UnsupportedInput`] when the text does not open with
/// an SRT cue header.
pub fn parse_srt(text: &str) -> Result<Vec<Utterance>> {
    let re = srt_header();
    let trimmed = text.trim_start();
    if !re
        .find(trimmed)
        .map(|m| m.start() == 0)
        .unwrap_or(false)
    {
        return Err(Error::unsupported_input(
            "srt file does not start with a cue header",
        ));
    }

    Ok(re
        .split(trimmed)
        .skip(1)
        .map(|cue| Utterance::new("SPEAKER", cue.trim().replace('\n', " ")))
        .collect())
}

/// The structural signature of one parsed speaker line. Used to check
/// format consistency in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineShape {
    separator: bool,
    timed: bool,
    inline_text: bool,
}

#[derive(Debug)]
struct SpeakerLine {
    speaker: String,
    text: Option<String>,
    shape: LineShape,
}

/// Parse a free-form conversation transcript into utterances.
///
/// Recognized line shapes, mixed with continuation lines:
///
/// ```text
/// Ana: how was the weekend?
/// [12:30] Ben: quiet, mostly reading
/// CHARLIE
/// also quiet here
/// ```
///
/// With `strict` set, every speaker line must share the first line's
/// structure (same timestamp and separator shape); otherwise shape drift
/// is tolerated. SRT input is detected and delegated to [`parse_srt`].
pub fn parse_conversation(text: &str, strict: bool) -> Result<Vec<Utterance>> {
    let trimmed = text.trim_start();
    if srt_header()
        .find(trimmed)
        .map(|m| m.start() == 0)
        .unwrap_or(false)
    {
        return parse_srt(trimmed);
    }

    let mut result: Vec<Utterance> = Vec::new();
    let mut structure: Option<LineShape> = None;
    let mut waiting_for_text = false;

    for (i, raw) in text.trim().lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }

        if waiting_for_text {
            if let Some(last) = result.last_mut() {
                last.text = raw.trim().to_string();
            }
            waiting_for_text = false;
            continue;
        }

        let parsed = match parse_speaker_line(raw) {
            Some(line) => line,
            None => {
                // continuation of the previous utterance
                match result.last_mut() {
                    Some(last) => {
                        last.text.push('\n');
                        last.text.push_str(raw.trim());
                        continue;
                    }
                    None => {
                        return Err(Error::unsupported_input(format!(
                            "invalid conversation format at line {i}"
                        )))
                    }
                }
            }
        };

        match structure {
            None => structure = Some(parsed.shape),
            Some(first) => {
                if strict && first != parsed.shape {
                    return Err(Error::unsupported_input(format!(
                        "conversation format changes at line {i}"
                    )));
                }
            }
        }

        waiting_for_text = parsed.text.is_none();
        result.push(Utterance::new(parsed.speaker, parsed.text.unwrap_or_default()));
    }

    // a trailing speaker line with no text is dropped
    if result.last().map(|u| u.text.trim().is_empty()).unwrap_or(false) {
        result.pop();
    }

    Ok(result)
}

fn parse_speaker_line(line: &str) -> Option<SpeakerLine> {
    let mut rest = line;
    let mut timed = false;

    if let Some(caps) = bracket_timestamp().captures(rest) {
        let whole = caps.get(0)?;
        let closed = caps.get(2).map(|m| !m.as_str().is_empty()).unwrap_or(false);
        if closed || whole.as_str().contains('/') {
            timed = true;
            rest = &rest[whole.end()..];
        }
    }
    if !timed {
        if let Some(m) = clock_timestamp().find(rest) {
            timed = true;
            rest = &rest[m.end()..];
        }
    }

    // a bare speaker name carries its text on the following line; without
    // a timestamp only an ALL-CAPS name is trusted as a speaker
    let name_only = if timed { any_case_speaker() } else { caps_speaker() };
    if let Some(m) = name_only.find(rest) {
        return Some(SpeakerLine {
            speaker: m.as_str().trim().to_string(),
            text: None,
            shape: LineShape {
                separator: false,
                timed,
                inline_text: false,
            },
        });
    }

    let colon = match rest.find(':') {
        Some(pos) => pos,
        None if timed => {
            if !rest.trim().is_empty() {
                return None;
            }
            return Some(SpeakerLine {
                speaker: "Speaker".to_string(),
                text: None,
                shape: LineShape {
                    separator: false,
                    timed,
                    inline_text: false,
                },
            });
        }
        None => return None,
    };

    let after = &rest[colon + 1..];
    let inline_text = !after.trim().is_empty();
    if inline_text && !after.starts_with([' ', '\t']) {
        // "12:30" inside prose, not a speaker separator
        return None;
    }

    Some(SpeakerLine {
        speaker: rest[..colon].trim().to_string(),
        text: inline_text.then(|| after.trim().to_string()),
        shape: LineShape {
            separator: true,
            timed,
            inline_text,
        },
    })
}
