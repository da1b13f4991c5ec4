/*!
 * VTT and SRT rendering of recognition segments.
 *
 * Each segment becomes exactly one cue. The cue text is wrapped with
 * [`wrap_text`] and the timestamps use the separator of the target format.
 * Rendering is pure: the same segments and width always give the same bytes.
 */

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::captions::transcript::Segment;
use crate::captions::wrap::wrap_text;
use crate::errors::CaptionError;

/// Separator between the start and end time of a cue
const TIMING_ARROW: &str = "-->";

/// Timed-text document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionFormat {
    /// WebVTT
    Vtt,
    /// SubRip
    Srt,
}

impl CaptionFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }

    // @returns: Separator between seconds and milliseconds
    fn millis_separator(self) -> char {
        match self {
            Self::Vtt => '.',
            Self::Srt => ',',
        }
    }
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for CaptionFormat {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vtt" => Ok(Self::Vtt),
            "srt" => Ok(Self::Srt),
            _ => Err(CaptionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// One timed, line-wrapped caption unit
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub lines: Vec<String>,
}

// @escapes: Timing arrows in cue text, until none remain
fn escape_arrows(text: &str) -> String {
    let mut escaped = text.to_string();
    while escaped.contains(TIMING_ARROW) {
        escaped = escaped.replace(TIMING_ARROW, "->");
    }
    escaped
}

impl Cue {
    /// Build the cue for a segment by wrapping its text
    ///
    /// `-->` inside the text becomes `->` so no text line reads as a timing line.
    pub fn from_segment(segment: &Segment, max_width: usize) -> Self {
        Cue {
            start: segment.start,
            end: segment.end,
            lines: wrap_text(&escape_arrows(&segment.text), max_width),
        }
    }

    /// Cue body: wrapped lines joined by line breaks
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    // @writes: Timing line and body, terminated by a newline
    fn write_to(&self, out: &mut String, format: CaptionFormat) {
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp(self.start, format),
            format_timestamp(self.end, format)
        );
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Serialized caption document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedTextDocument {
    format: CaptionFormat,
    body: String,
}

impl TimedTextDocument {
    pub fn format(&self) -> CaptionFormat {
        self.format
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for TimedTextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Format a time in seconds as `HH:MM:SS.mmm` (VTT) or `HH:MM:SS,mmm` (SRT).
///
/// Rounds to the nearest millisecond. Hours are not capped at 24. Negative
/// or non-finite times render as zero.
pub fn format_timestamp(seconds: f64, format: CaptionFormat) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours,
        minutes,
        secs,
        format.millis_separator(),
        millis
    )
}

/// Render segments into a caption document of the given format
pub fn format_segments(segments: &[Segment], format: CaptionFormat, max_width: usize) -> TimedTextDocument {
    let mut body = String::new();

    if format == CaptionFormat::Vtt {
        body.push_str("WEBVTT\n");
    }

    for (index, segment) in segments.iter().enumerate() {
        let cue = Cue::from_segment(segment, max_width);

        // Blank line after the VTT header and between cues
        if index > 0 || format == CaptionFormat::Vtt {
            body.push('\n');
        }
        if format == CaptionFormat::Srt {
            let _ = writeln!(body, "{}", index + 1);
        }
        cue.write_to(&mut body, format);
    }

    TimedTextDocument { format, body }
}

/// Render segments into the format named by `format_name` ("vtt" or "srt")
pub fn format_segments_named(
    segments: &[Segment],
    format_name: &str,
    max_width: usize,
) -> Result<TimedTextDocument, CaptionError> {
    let format = format_name.parse::<CaptionFormat>()?;
    Ok(format_segments(segments, format, max_width))
}
