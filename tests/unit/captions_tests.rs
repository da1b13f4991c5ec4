/*!
 * Tests for caption formatting, wrapping and transcript text
 */

use autocaption::captions::{
    format_segments, format_segments_named, format_timestamp, split_sentences, transcript_text, wrap_text,
    wrap_text_signed, CaptionFormat, Segment,
};
use autocaption::errors::CaptionError;

fn lecture_segments() -> Vec<Segment> {
    vec![
        Segment::new(0.0, 3.2, " So today we are going to talk about the structure of caption files."),
        Segment::new(3.2, 5.0, " Any questions?"),
    ]
}

/// Test full VTT document layout with wrapping
#[test]
fn test_formatSegments_vttWithNarrowWidth_shouldWrapCueLines() {
    let doc = format_segments(&lecture_segments(), CaptionFormat::Vtt, 32);

    let expected = "WEBVTT\n\
\n\
00:00:00.000 --> 00:00:03.200\n\
So today we are going to talk\n\
about the structure of caption\n\
files.\n\
\n\
00:00:03.200 --> 00:00:05.000\n\
Any questions?\n";
    assert_eq!(doc.body(), expected);
    assert_eq!(doc.format(), CaptionFormat::Vtt);
}

/// Test full SRT document layout
#[test]
fn test_formatSegments_srt_shouldNumberCuesFromOne() {
    let doc = format_segments(&lecture_segments(), CaptionFormat::Srt, 80);

    let expected = "1\n\
00:00:00,000 --> 00:00:03,200\n\
So today we are going to talk about the structure of caption files.\n\
\n\
2\n\
00:00:03,200 --> 00:00:05,000\n\
Any questions?\n";
    assert_eq!(doc.to_string(), expected);
}

/// Test that SRT and VTT carry the same cue text and count
#[test]
fn test_formatSegments_bothFormats_shouldAgreeOnCues() {
    let segments = lecture_segments();
    let vtt = format_segments(&segments, CaptionFormat::Vtt, 20);
    let srt = format_segments(&segments, CaptionFormat::Srt, 20);

    let vtt_timings = vtt.body().lines().filter(|l| l.contains(" --> ")).count();
    let srt_timings = srt.body().lines().filter(|l| l.contains(" --> ")).count();
    assert_eq!(vtt_timings, segments.len());
    assert_eq!(srt_timings, segments.len());

    let text_lines = |body: &str| -> Vec<String> {
        body.lines()
            .filter(|l| !l.is_empty() && !l.contains(" --> ") && *l != "WEBVTT" && l.parse::<usize>().is_err())
            .map(str::to_string)
            .collect()
    };
    assert_eq!(text_lines(vtt.body()), text_lines(srt.body()));
}

/// Test empty segment lists
#[test]
fn test_formatSegments_withNoSegments_shouldProduceHeaderOnly() {
    assert_eq!(format_segments(&[], CaptionFormat::Vtt, 80).body(), "WEBVTT\n");
    assert_eq!(format_segments(&[], CaptionFormat::Srt, 80).body(), "");
}

/// Test segments whose text is empty or whitespace only
#[test]
fn test_formatSegments_withBlankSegmentText_shouldEmitTimingLineOnly() {
    let segments = vec![Segment::new(0.0, 1.0, ""), Segment::new(1.0, 2.0, "   \t ")];

    let vtt = format_segments(&segments, CaptionFormat::Vtt, 80);
    let srt = format_segments(&segments, CaptionFormat::Srt, 80);

    assert_eq!(
        vtt.body(),
        "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\n\n00:00:01.000 --> 00:00:02.000\n"
    );
    assert_eq!(
        srt.body(),
        "1\n00:00:00,000 --> 00:00:01,000\n\n2\n00:00:01,000 --> 00:00:02,000\n"
    );
}

/// Test that arrows spoken in the text cannot pass for a timing line
#[test]
fn test_formatSegments_withArrowInText_shouldEscapeToSingleArrow() {
    let segments = vec![Segment::new(0.0, 1.0, " Step one --> step two")];

    for format in [CaptionFormat::Vtt, CaptionFormat::Srt] {
        let doc = format_segments(&segments, format, 80);
        let timing_lines = doc.body().lines().filter(|l| l.contains("-->")).count();

        assert_eq!(timing_lines, segments.len());
        assert!(doc.body().ends_with("Step one -> step two\n"));
    }
}

/// Test format selection by name
#[test]
fn test_formatSegmentsNamed_withUnknownName_shouldFail() {
    let segments = lecture_segments();

    assert!(format_segments_named(&segments, "SRT", 80).is_ok());
    assert!(matches!(
        format_segments_named(&segments, "ass", 80),
        Err(CaptionError::UnsupportedFormat(name)) if name == "ass"
    ));
}

/// Test timestamp rounding and boundaries
#[test]
fn test_formatTimestamp_shouldRoundToMilliseconds() {
    assert_eq!(format_timestamp(0.0, CaptionFormat::Vtt), "00:00:00.000");
    assert_eq!(format_timestamp(1.0006, CaptionFormat::Srt), "00:00:01,001");
    assert_eq!(format_timestamp(59.9996, CaptionFormat::Vtt), "00:01:00.000");
    assert_eq!(format_timestamp(-2.0, CaptionFormat::Srt), "00:00:00,000");
    assert_eq!(format_timestamp(90_000.0, CaptionFormat::Vtt), "25:00:00.000");
}

/// Test wrapping keeps every word and respects the width
#[test]
fn test_wrapText_withVariousWidths_shouldPreserveWords() {
    let text = "the quick brown fox jumps over the lazy dog";
    for width in 1..=50 {
        let lines = wrap_text(text, width);
        assert_eq!(lines.join(" "), text, "width {}", width);
        for line in &lines {
            let single_word = !line.contains(' ');
            assert!(line.chars().count() <= width || single_word, "width {}: {:?}", width, line);
        }
    }
}

/// Test wrapping edge cases
#[test]
fn test_wrapText_edgeCases() {
    assert!(wrap_text("", 10).is_empty());
    assert!(wrap_text("   \n\t ", 10).is_empty());
    assert_eq!(wrap_text("supercalifragilistic is long", 5), vec!["supercalifragilistic", "is", "long"]);
    assert_eq!(wrap_text_signed("a b c", -1), vec!["a b c"]);
    assert_eq!(wrap_text("héllo wörld", 5), vec!["héllo", "wörld"]);
}

/// Test sentence splitting and transcript text
#[test]
fn test_transcriptText_shouldPutOneSentencePerParagraph() {
    assert_eq!(
        split_sentences("Wait... What?! Yes. trailing"),
        vec!["Wait...", "What?!", "Yes.", "trailing"]
    );
    assert_eq!(split_sentences("no terminator here"), vec!["no terminator here"]);
    assert!(split_sentences("  ").is_empty());
    assert_eq!(transcript_text(" Hello world. How are you?"), "Hello world.\n\nHow are you?");
}
