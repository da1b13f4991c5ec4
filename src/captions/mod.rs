/*!
 * Caption generation from recognition segments.
 *
 * - `transcript`: segments, transcripts and the plain-text sentence view
 * - `wrap`: greedy line wrapping of segment text
 * - `format`: VTT and SRT document rendering
 */

pub use self::format::{format_segments, format_segments_named, format_timestamp, CaptionFormat, Cue, TimedTextDocument};
pub use self::transcript::{split_sentences, transcript_text, Segment, Transcript};
pub use self::wrap::{wrap_text, wrap_text_signed};

pub mod format;
pub mod transcript;
pub mod wrap;

/// Line width used for burned-in and sidecar captions
pub const DEFAULT_MAX_LINE_WIDTH: usize = 80;
