/*!
 * Mock transcoder for testing.
 *
 * Instead of running ffmpeg it writes small placeholder files at the
 * requested output paths, so later stages see real artifacts on disk.
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::CaptionError;
use crate::media::Transcoder;

/// Contents written in place of extracted audio
pub const MOCK_AUDIO_BYTES: &[u8] = b"RIFF-mock-audio";

/// Contents written in place of a rendered video
pub const MOCK_VIDEO_BYTES: &[u8] = b"mock-rendered-video";

/// Behavior mode for the mock transcoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockTranscoderBehavior {
    /// Every operation succeeds
    Working,
    /// Audio extraction fails (unreadable container)
    FailExtraction,
    /// Burn-in fails
    FailRender,
    /// Burn-in reports success without writing the output
    SilentRender,
    /// ffmpeg cannot be launched
    Unavailable,
}

/// Scripted transcoder that counts its calls
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    behavior: MockTranscoderBehavior,
    extract_calls: Arc<AtomicUsize>,
    render_calls: Arc<AtomicUsize>,
}

impl MockTranscoder {
    pub fn new(behavior: MockTranscoderBehavior) -> Self {
        Self {
            behavior,
            extract_calls: Arc::new(AtomicUsize::new(0)),
            render_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockTranscoderBehavior::Working)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    fn unavailable_error() -> CaptionError {
        CaptionError::EngineUnavailable {
            tool: "mock-ffmpeg".to_string(),
            message: "Simulated missing transcoder".to_string(),
        }
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn check_available(&self) -> Result<(), CaptionError> {
        match self.behavior {
            MockTranscoderBehavior::Unavailable => Err(Self::unavailable_error()),
            _ => Ok(()),
        }
    }

    async fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<(), CaptionError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockTranscoderBehavior::FailExtraction => Err(CaptionError::Extraction(format!(
                "Simulated invalid data in {}",
                video.display()
            ))),
            MockTranscoderBehavior::Unavailable => Err(Self::unavailable_error()),
            _ => {
                tokio::fs::write(audio_out, MOCK_AUDIO_BYTES).await?;
                Ok(())
            }
        }
    }

    async fn burn_subtitles(
        &self,
        _video: &Path,
        _audio: &Path,
        srt_path: &Path,
        output: &Path,
    ) -> Result<(), CaptionError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockTranscoderBehavior::FailRender => {
                Err(CaptionError::Render("Simulated encoder failure".to_string()))
            }
            MockTranscoderBehavior::SilentRender => Ok(()),
            MockTranscoderBehavior::Unavailable => Err(Self::unavailable_error()),
            _ => {
                if !srt_path.exists() {
                    return Err(CaptionError::Render(format!(
                        "Caption file missing: {}",
                        srt_path.display()
                    )));
                }
                tokio::fs::write(output, MOCK_VIDEO_BYTES).await?;
                Ok(())
            }
        }
    }
}
