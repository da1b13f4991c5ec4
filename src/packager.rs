/*!
 * Archive packaging of a finished job.
 *
 * The archive always holds exactly four entries with fixed names: the
 * plain-text transcript, both caption documents and the rendered video.
 */

use std::fs::File;
use std::io::{self, Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::captions::TimedTextDocument;
use crate::errors::CaptionError;

/// Archive entry for the plain-text transcript
pub const TRANSCRIPT_ENTRY: &str = "transcript.txt";
/// Archive entry for the VTT captions
pub const VTT_ENTRY: &str = "transcript.vtt";
/// Archive entry for the SRT captions
pub const SRT_ENTRY: &str = "transcript.srt";
/// Archive entry for the captioned video
pub const VIDEO_ENTRY: &str = "final.mp4";

/// All entry names, in archive order
pub const ARCHIVE_ENTRIES: [&str; 4] = [TRANSCRIPT_ENTRY, VTT_ENTRY, SRT_ENTRY, VIDEO_ENTRY];

fn zip_error(e: zip::result::ZipError) -> CaptionError {
    CaptionError::Packaging(e.to_string())
}

fn io_error(e: io::Error) -> CaptionError {
    CaptionError::Packaging(e.to_string())
}

/// Bundle the transcript, both caption documents and the rendered video into a zip archive.
///
/// Fails with `CaptionError::Packaging` when the rendered video is absent,
/// so a degraded archive is never produced silently.
pub fn package(
    transcript_text: &str,
    vtt: &TimedTextDocument,
    srt: &TimedTextDocument,
    rendered_video: Option<&Path>,
) -> Result<Vec<u8>, CaptionError> {
    let video_path = rendered_video
        .ok_or_else(|| CaptionError::Packaging("Rendered video is missing".to_string()))?;

    let mut video = File::open(video_path).map_err(|e| {
        CaptionError::Packaging(format!("Rendered video unavailable at {}: {}", video_path.display(), e))
    })?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let text_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // Video streams are already compressed
    let video_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(true);

    for (name, contents) in [
        (TRANSCRIPT_ENTRY, transcript_text),
        (VTT_ENTRY, vtt.body()),
        (SRT_ENTRY, srt.body()),
    ] {
        writer.start_file(name, text_options).map_err(zip_error)?;
        writer.write_all(contents.as_bytes()).map_err(io_error)?;
    }

    writer.start_file(VIDEO_ENTRY, video_options).map_err(zip_error)?;
    io::copy(&mut video, &mut writer).map_err(io_error)?;

    let cursor = writer.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

/// Write archive bytes to `path`, creating parent directories as needed
pub fn write_archive(bytes: &[u8], path: &Path) -> Result<(), CaptionError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
    }
    std::fs::write(path, bytes).map_err(io_error)
}
