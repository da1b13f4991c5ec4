/*!
 * A single captioning job.
 *
 * Each job owns a private workspace directory named after a fresh UUID.
 * All intermediate artifacts live there and are passed between stages as
 * `JobPaths` values. The workspace is deleted when the job is dropped,
 * whether the run succeeded or failed.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;
use uuid::Uuid;

use crate::captions::{format_segments, CaptionFormat, TimedTextDocument, Transcript};
use crate::errors::{CaptionError, PipelineStage};
use crate::file_utils::FileManager;
use crate::recognition::Task;

/// Lifecycle of a job; strictly linear, with `Failed` reachable from any state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    AudioExtracted,
    Recognized,
    CuesBuilt,
    CaptionedVideoRendered,
    Packaged,
    Done,
    Failed {
        stage: PipelineStage,
        cause: String,
    },
}

impl JobState {
    // @returns: Successor on the happy path, None for terminal states
    pub fn next(&self) -> Option<JobState> {
        match self {
            Self::Submitted => Some(Self::AudioExtracted),
            Self::AudioExtracted => Some(Self::Recognized),
            Self::Recognized => Some(Self::CuesBuilt),
            Self::CuesBuilt => Some(Self::CaptionedVideoRendered),
            Self::CaptionedVideoRendered => Some(Self::Packaged),
            Self::Packaged => Some(Self::Done),
            Self::Done | Self::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => f.write_str("submitted"),
            Self::AudioExtracted => f.write_str("audio extracted"),
            Self::Recognized => f.write_str("recognized"),
            Self::CuesBuilt => f.write_str("cues built"),
            Self::CaptionedVideoRendered => f.write_str("captioned video rendered"),
            Self::Packaged => f.write_str("packaged"),
            Self::Done => f.write_str("done"),
            Self::Failed { stage, cause } => write!(f, "failed at {}: {}", stage, cause),
        }
    }
}

/// Job-scoped artifact locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub root: PathBuf,
    pub input_video: PathBuf,
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub vtt: PathBuf,
    pub srt: PathBuf,
    pub rendered_video: PathBuf,
}

impl JobPaths {
    /// Artifact paths inside `root`; the input copy keeps its container extension
    pub fn new(root: &Path, input_extension: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            input_video: root.join(format!("input.{}", input_extension)),
            audio: root.join("audio.wav"),
            transcript: root.join("transcript.txt"),
            vtt: root.join("transcript.vtt"),
            srt: root.join("transcript.srt"),
            rendered_video: root.join("final.mp4"),
        }
    }
}

/// Transcript text and both caption documents for one job
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSet {
    pub transcript_text: String,
    pub vtt: TimedTextDocument,
    pub srt: TimedTextDocument,
}

impl CaptionSet {
    /// Render both caption formats and the sentence-per-paragraph transcript
    pub fn build(transcript: &Transcript, max_line_width: usize) -> Self {
        Self {
            transcript_text: transcript.plain_text(),
            vtt: format_segments(&transcript.segments, CaptionFormat::Vtt, max_line_width),
            srt: format_segments(&transcript.segments, CaptionFormat::Srt, max_line_width),
        }
    }
}

/// One pipeline invocation and everything it produced so far
pub struct Job {
    id: Uuid,
    task: Task,
    source: PathBuf,
    workspace: TempDir,
    paths: JobPaths,
    state: JobState,
    transcript: Option<Transcript>,
    captions: Option<CaptionSet>,
    rendered_video: Option<PathBuf>,
}

impl Job {
    /// Create the job workspace under `work_dir` and copy the source video into it
    pub fn create(work_dir: &Path, source: &Path, task: Task) -> Result<Self, CaptionError> {
        let id = Uuid::new_v4();
        FileManager::ensure_dir(work_dir)?;

        let workspace = tempfile::Builder::new()
            .prefix(&format!("autocaption-{}-", id))
            .tempdir_in(work_dir)?;

        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp4".to_string());
        let paths = JobPaths::new(workspace.path(), &extension);

        FileManager::copy_file(source, &paths.input_video)?;
        debug!("Job {} workspace: {}", id, paths.root.display());

        Ok(Self {
            id,
            task,
            source: source.to_path_buf(),
            workspace,
            paths,
            state: JobState::Submitted,
            transcript: None,
            captions: None,
            rendered_video: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Video the job was submitted with
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn paths(&self) -> &JobPaths {
        &self.paths
    }

    pub fn workspace_dir(&self) -> &Path {
        self.workspace.path()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    pub fn captions(&self) -> Option<&CaptionSet> {
        self.captions.as_ref()
    }

    pub fn rendered_video(&self) -> Option<&Path> {
        self.rendered_video.as_deref()
    }

    // @transitions: One step along the happy path
    fn advance(&mut self) {
        match self.state.next() {
            Some(next) => {
                info!("Job {}: {} -> {}", self.id, self.state, next);
                self.state = next;
            }
            None => warn!("Job {} is already {}, not advancing", self.id, self.state),
        }
    }

    /// Record that the audio track has been extracted
    pub fn mark_audio_extracted(&mut self) {
        self.advance();
    }

    /// Store the recognition result
    pub fn set_transcript(&mut self, transcript: Transcript) {
        self.transcript = Some(transcript);
        self.advance();
    }

    /// Store the rendered caption documents
    pub fn set_captions(&mut self, captions: CaptionSet) {
        self.captions = Some(captions);
        self.advance();
    }

    /// Record the captioned video path
    pub fn set_rendered_video(&mut self, path: PathBuf) {
        self.rendered_video = Some(path);
        self.advance();
    }

    pub fn mark_packaged(&mut self) {
        self.advance();
    }

    pub fn mark_done(&mut self) {
        self.advance();
    }

    /// Move to the terminal failed state
    pub fn fail(&mut self, stage: PipelineStage, cause: &CaptionError) {
        warn!("Job {} failed during {}: {}", self.id, stage, cause);
        self.state = JobState::Failed {
            stage,
            cause: cause.to_string(),
        };
    }

    /// Write the caption documents into the workspace for the burn-in stage
    pub fn write_captions(&self) -> Result<(), CaptionError> {
        let captions = self
            .captions
            .as_ref()
            .ok_or_else(|| CaptionError::Render("Captions have not been built".to_string()))?;

        FileManager::write_to_file(&self.paths.transcript, &captions.transcript_text)?;
        FileManager::write_to_file(&self.paths.vtt, captions.vtt.body())?;
        FileManager::write_to_file(&self.paths.srt, captions.srt.body())?;
        Ok(())
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("task", &self.task)
            .field("source", &self.source)
            .field("state", &self.state)
            .field("workspace", &self.paths.root)
            .finish()
    }
}
