use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

// @module: Recognition output and its plain-text view

/// One timestamped span of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Recognized text
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Segment {
            start,
            end,
            text: text.into(),
        }
    }

    // @creates: Segment checked against 0 <= start < end
    pub fn new_validated(start: f64, end: f64, text: impl Into<String>) -> Result<Self, CaptionError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(CaptionError::Recognition(format!(
                "Invalid segment time range: start {} end {}",
                start, end
            )));
        }
        Ok(Self::new(start, end, text))
    }
}

/// Full recognition result for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Language code as reported by the engine
    pub language: String,

    /// Complete recognized text
    #[serde(rename = "text")]
    pub full_text: String,

    /// Segments in engine order
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn new(language: impl Into<String>, full_text: impl Into<String>, segments: Vec<Segment>) -> Self {
        Transcript {
            language: language.into(),
            full_text: full_text.into(),
            segments,
        }
    }

    /// Plain-text transcript, one sentence per paragraph
    pub fn plain_text(&self) -> String {
        transcript_text(&self.full_text)
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split text into sentences on `.`, `!` and `?`, keeping each terminator
/// with its sentence.
///
/// Runs of terminators ("...", "?!") stay together. Text without any
/// terminator is one sentence. A trailing fragment after the last
/// terminator is kept only if it holds an alphanumeric character.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if !is_terminator(c) {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            current.push(next);
            chars.next();
        }
        let sentence = current.trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        current.clear();
    }

    let rest = current.trim();
    if rest.chars().any(char::is_alphanumeric) {
        sentences.push(rest.to_string());
    }

    sentences
}

/// Sentences of `full_text` separated by a blank line
pub fn transcript_text(full_text: &str) -> String {
    split_sentences(full_text).join("\n\n")
}
