/*!
 * Error types for the autocaption pipeline.
 *
 * Every failure a job can hit is a `CaptionError`. The orchestrator tags
 * it with the `PipelineStage` it came from, producing a `JobFailure` that
 * carries the single user-facing message for the run.
 */

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the caption pipeline and its collaborators
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Task selector is neither transcribe nor translate
    #[error("Unsupported task '{0}', expected 'transcribe' or 'translate'")]
    InvalidTask(String),

    /// Input video does not exist or cannot be read
    #[error("Input file not found or unreadable: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input has a container extension we do not accept
    #[error("Unsupported input container: {}", .0.display())]
    UnsupportedInput(PathBuf),

    /// Recognition engine or transcoder binary cannot be launched
    #[error("External tool unavailable: {tool} ({message})")]
    EngineUnavailable {
        /// Binary name or path
        tool: String,
        /// Launch error
        message: String,
    },

    /// Audio could not be extracted from the input
    #[error("Audio extraction failed: {0}")]
    Extraction(String),

    /// Recognition engine crashed or produced unusable output
    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    /// Caption format name is neither vtt nor srt
    #[error("Unsupported caption format: {0}")]
    UnsupportedFormat(String),

    /// Burning captions into the video failed
    #[error("Rendering captioned video failed: {0}")]
    Render(String),

    /// Archive could not be produced
    #[error("Packaging failed: {0}")]
    Packaging(String),

    /// Filesystem error while handling job artifacts
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Submission checks, before any external call
    Submission,
    Extraction,
    Recognition,
    CueBuilding,
    Render,
    Packaging,
}

impl PipelineStage {
    /// Label used in logs and user messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Extraction => "extraction",
            Self::Recognition => "recognition",
            Self::CueBuilding => "cue building",
            Self::Render => "render",
            Self::Packaging => "packaging",
        }
    }

    // @returns: Generic remediation hint shown with a failure
    fn hint(self) -> &'static str {
        match self {
            Self::Submission => "check the input file and task selection, then try again",
            Self::Extraction => "the input could not be read as video; try another file or container",
            Self::Recognition => "check that the recognition engine and its model are installed",
            Self::CueBuilding => "this is an internal error; please report it",
            Self::Render => "the captions are still available; check the ffmpeg installation",
            Self::Packaging => "the captions are still available; check free disk space",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stage failure as reported to the caller
#[derive(Error, Debug)]
#[error("{stage} stage failed: {error}")]
pub struct JobFailure {
    /// Stage that failed
    pub stage: PipelineStage,
    /// Underlying cause
    #[source]
    pub error: CaptionError,
}

impl JobFailure {
    pub fn new(stage: PipelineStage, error: CaptionError) -> Self {
        Self { stage, error }
    }

    /// Single user-visible message naming the stage and a remediation hint
    pub fn user_message(&self) -> String {
        format!(
            "The {} stage failed: {}. Hint: {}.",
            self.stage.label(),
            self.error,
            self.stage.hint()
        )
    }
}

/// Tag errors with the stage they happened in
pub trait StageContext<T> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, JobFailure>;
}

impl<T> StageContext<T> for Result<T, CaptionError> {
    fn at_stage(self, stage: PipelineStage) -> Result<T, JobFailure> {
        self.map_err(|error| JobFailure::new(stage, error))
    }
}
