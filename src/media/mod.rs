/*!
 * Media transcoding collaborators.
 *
 * - `ffmpeg`: transcoder running the ffmpeg binary
 * - `mock`: scripted transcoder for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::CaptionError;

pub use self::ffmpeg::FfmpegTranscoder;

pub mod ffmpeg;
pub mod mock;

/// Sample rate of the audio handed to the recognition engine
pub const RECOGNITION_SAMPLE_RATE: u32 = 16_000;

/// Common trait for media transcoders
#[async_trait]
pub trait Transcoder: Send + Sync + Debug {
    /// Check that the transcoder can be launched
    async fn check_available(&self) -> Result<(), CaptionError>;

    /// Write the video's audio track to `audio_out` as mono 16 kHz signed
    /// 16-bit PCM WAV, overwriting any existing file
    async fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<(), CaptionError>;

    /// Burn the SRT captions into the video's picture track, remux the
    /// extracted audio, and write the result to `output` (overwriting)
    async fn burn_subtitles(
        &self,
        video: &Path,
        audio: &Path,
        srt_path: &Path,
        output: &Path,
    ) -> Result<(), CaptionError>;
}
