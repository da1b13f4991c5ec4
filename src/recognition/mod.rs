/*!
 * Speech recognition engines.
 *
 * The pipeline only sees the `Recognizer` trait, so the whisper CLI and the
 * mock used by tests are interchangeable:
 * - `whisper`: runs the whisper command-line tool
 * - `mock`: scripted recognizer for tests
 */

use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::app_config::RecognitionConfig;
use crate::captions::Transcript;
use crate::errors::CaptionError;

pub use self::whisper::WhisperRecognizer;

pub mod mock;
pub mod whisper;

/// What the engine should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Captions in the spoken language
    Transcribe,
    /// Captions translated to English
    Translate,
}

impl Task {
    /// Value passed to the engine's task option
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            _ => Err(CaptionError::InvalidTask(s.to_string())),
        }
    }
}

/// Common trait for speech recognition engines
#[async_trait]
pub trait Recognizer: Send + Sync + Debug {
    /// Check that the engine can be launched
    async fn check_available(&self) -> Result<(), CaptionError>;

    /// Recognize speech in a 16 kHz mono WAV file
    ///
    /// Segments come back in engine order; they are not validated or re-sorted.
    async fn recognize(&self, audio_path: &Path, task: Task) -> Result<Transcript, CaptionError>;
}

static SHARED_RECOGNIZER: OnceCell<Arc<WhisperRecognizer>> = OnceCell::new();

/// Process-wide recognizer handle, created on first use.
///
/// The configuration of the first caller wins; later calls share that engine.
pub fn shared_recognizer(config: &RecognitionConfig) -> Arc<dyn Recognizer> {
    let recognizer = SHARED_RECOGNIZER.get_or_init(|| Arc::new(WhisperRecognizer::new(config.clone())));
    recognizer.clone()
}
