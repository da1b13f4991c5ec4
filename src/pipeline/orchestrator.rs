/*!
 * Pipeline orchestrator for captioning jobs.
 *
 * A job moves through these stages, one after the other, each at most once:
 * 1. Extraction: audio track to 16 kHz mono PCM
 * 2. Recognition: segments from the speech engine
 * 3. Cue building: VTT, SRT and plain-text transcript
 * 4. Render: captions burned into the picture
 * 5. Packaging: archive of everything, published to the output directory
 *
 * Nothing is retried. Failures before captions exist are returned as a
 * `JobFailure`. Once captions exist, a render or packaging failure still
 * publishes the transcript and caption files and is reported on the
 * returned `JobOutcome`.
 */

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use uuid::Uuid;

use crate::captions::DEFAULT_MAX_LINE_WIDTH;
use crate::errors::{CaptionError, JobFailure, PipelineStage, StageContext};
use crate::file_utils::FileManager;
use crate::media::Transcoder;
use crate::packager;
use crate::pipeline::job::{CaptionSet, Job, JobState};
use crate::pipeline::progress::{NoProgress, ProgressReporter};
use crate::recognition::{Recognizer, Task};

/// Settings shared by every job an orchestrator runs
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Parent directory of per-job workspaces
    pub work_dir: PathBuf,

    /// Maximum characters per caption line
    pub max_line_width: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
        }
    }
}

/// Files published to the output directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedArtifacts {
    pub transcript: Option<PathBuf>,
    pub vtt: Option<PathBuf>,
    pub srt: Option<PathBuf>,
    pub rendered_video: Option<PathBuf>,
    pub archive: Option<PathBuf>,
}

/// Result of a job that got as far as building captions
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub task: Task,
    /// Language reported by the recognition engine
    pub language: String,
    /// Original video, for preview next to the rendered one
    pub source_video: PathBuf,
    /// `Done` on success, `Failed` when render or packaging failed
    pub final_state: JobState,
    pub captions: CaptionSet,
    pub published: PublishedArtifacts,
    /// Render or packaging failure, with partial results still published
    pub failure: Option<JobFailure>,
}

impl JobOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.final_state == JobState::Done
    }
}

/// Runs captioning jobs against a recognition engine and a transcoder
pub struct Orchestrator {
    recognizer: Arc<dyn Recognizer>,
    transcoder: Arc<dyn Transcoder>,
    settings: PipelineSettings,
    progress: Arc<dyn ProgressReporter>,
}

impl Orchestrator {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        transcoder: Arc<dyn Transcoder>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            recognizer,
            transcoder,
            settings,
            progress: Arc::new(NoProgress),
        }
    }

    /// Set the reporter notified when stages start and finish
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one job for `input` with the task named by `task`, publishing
    /// results into `output_dir`.
    ///
    /// The task is validated before anything else; an unknown task fails
    /// with `InvalidTask` without touching any external tool. A missing or
    /// unsupported input and an unavailable engine abort before any stage.
    pub async fn submit(&self, input: &Path, task: &str, output_dir: &Path) -> Result<JobOutcome, JobFailure> {
        let task = task.parse::<Task>().at_stage(PipelineStage::Submission)?;
        self.run(input, task, output_dir).await
    }

    /// Same as [`Orchestrator::submit`] with an already validated task
    pub async fn run(&self, input: &Path, task: Task, output_dir: &Path) -> Result<JobOutcome, JobFailure> {
        let start_time = Instant::now();

        FileManager::validate_input_video(input).at_stage(PipelineStage::Submission)?;
        self.recognizer.check_available().await.at_stage(PipelineStage::Submission)?;
        self.transcoder.check_available().await.at_stage(PipelineStage::Submission)?;

        let mut job = Job::create(&self.settings.work_dir, input, task).at_stage(PipelineStage::Submission)?;
        info!("Job {} submitted: {} ({})", job.id(), input.display(), task);

        let result = self.drive(&mut job, output_dir).await;

        match &result {
            Ok(outcome) if outcome.is_complete() => {
                info!("Job {} done in {:.1}s", job.id(), start_time.elapsed().as_secs_f64())
            }
            Ok(_) => warn!("Job {} finished with partial results", job.id()),
            Err(failure) => warn!("Job {} aborted: {}", job.id(), failure),
        }

        // Dropping the job removes its workspace
        result
    }

    async fn drive(&self, job: &mut Job, output_dir: &Path) -> Result<JobOutcome, JobFailure> {
        let paths = job.paths().clone();

        // Submitted -> AudioExtracted
        self.stage(
            job,
            PipelineStage::Extraction,
            self.transcoder.extract_audio(&paths.input_video, &paths.audio),
        )
        .await?;
        job.mark_audio_extracted();

        // AudioExtracted -> Recognized
        let task = job.task();
        let transcript = self
            .stage(job, PipelineStage::Recognition, self.recognizer.recognize(&paths.audio, task))
            .await?;
        match crate::language_utils::get_language_name(&transcript.language) {
            Some(name) => info!("Detected language: {} ({})", name, transcript.language),
            None => info!("Detected language: {}", transcript.language),
        }

        // Recognized -> CuesBuilt
        self.progress.stage_started(PipelineStage::CueBuilding);
        let captions = CaptionSet::build(&transcript, self.settings.max_line_width);
        job.set_transcript(transcript);
        job.set_captions(captions.clone());
        if let Err(e) = job.write_captions() {
            job.fail(PipelineStage::CueBuilding, &e);
            return Err(JobFailure::new(PipelineStage::CueBuilding, e));
        }
        self.progress.stage_finished(PipelineStage::CueBuilding);

        // CuesBuilt -> CaptionedVideoRendered
        let render = self
            .stage(
                job,
                PipelineStage::Render,
                self.transcoder
                    .burn_subtitles(&paths.input_video, &paths.audio, &paths.srt, &paths.rendered_video),
            )
            .await;
        if let Err(failure) = render {
            return self.finish_partial(job, captions, output_dir, failure);
        }
        job.set_rendered_video(paths.rendered_video.clone());

        // CaptionedVideoRendered -> Packaged
        self.progress.stage_started(PipelineStage::Packaging);
        let archive = match self.package(&captions, job.rendered_video()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                job.fail(PipelineStage::Packaging, &e);
                let failure = JobFailure::new(PipelineStage::Packaging, e);
                return self.finish_partial(job, captions, output_dir, failure);
            }
        };

        let published = match self.publish_all(job, &archive, output_dir) {
            Ok(published) => published,
            Err(e) => {
                job.fail(PipelineStage::Packaging, &e);
                return Err(JobFailure::new(PipelineStage::Packaging, e));
            }
        };
        job.mark_packaged();
        self.progress.stage_finished(PipelineStage::Packaging);

        // Packaged -> Done
        job.mark_done();
        Ok(Self::outcome(job, captions, published, None))
    }

    // @runs: One external stage, failing the job on error
    async fn stage<T, F>(&self, job: &mut Job, stage: PipelineStage, work: F) -> Result<T, JobFailure>
    where
        F: Future<Output = Result<T, CaptionError>>,
    {
        self.progress.stage_started(stage);
        match work.await {
            Ok(value) => {
                self.progress.stage_finished(stage);
                Ok(value)
            }
            Err(e) => {
                job.fail(stage, &e);
                Err(JobFailure::new(stage, e))
            }
        }
    }

    async fn package(&self, captions: &CaptionSet, rendered_video: Option<&Path>) -> Result<Vec<u8>, CaptionError> {
        let captions = captions.clone();
        let rendered = rendered_video.map(Path::to_path_buf);

        tokio::task::spawn_blocking(move || {
            packager::package(&captions.transcript_text, &captions.vtt, &captions.srt, rendered.as_deref())
        })
        .await
        .map_err(|e| CaptionError::Packaging(format!("Packaging task failed: {}", e)))?
    }

    // @publishes: Transcript and caption documents next to the outputs
    fn publish_captions(&self, job: &Job, output_dir: &Path) -> Result<PublishedArtifacts, CaptionError> {
        let paths = job.paths();
        let mut published = PublishedArtifacts::default();

        for (from, suffix, slot) in [
            (&paths.transcript, ".txt", &mut published.transcript),
            (&paths.vtt, ".vtt", &mut published.vtt),
            (&paths.srt, ".srt", &mut published.srt),
        ] {
            let to = FileManager::generate_output_path(job.source(), output_dir, suffix);
            FileManager::copy_file(from, &to)?;
            *slot = Some(to);
        }

        Ok(published)
    }

    // @publishes: Captions, archive and rendered video of a packaged job
    fn publish_all(&self, job: &Job, archive: &[u8], output_dir: &Path) -> Result<PublishedArtifacts, CaptionError> {
        let mut published = self.publish_captions(job, output_dir)?;

        let archive_path =
            FileManager::generate_output_path(job.source(), output_dir, "_transcripts_and_video.zip");
        let video_path = FileManager::generate_output_path(job.source(), output_dir, "_subtitled.mp4");
        packager::write_archive(archive, &archive_path)?;
        FileManager::copy_file(&job.paths().rendered_video, &video_path)?;

        published.archive = Some(archive_path);
        published.rendered_video = Some(video_path);
        Ok(published)
    }

    // @returns: Outcome carrying the failure, after publishing what exists
    fn finish_partial(
        &self,
        job: &Job,
        captions: CaptionSet,
        output_dir: &Path,
        failure: JobFailure,
    ) -> Result<JobOutcome, JobFailure> {
        warn!("{}", failure.user_message());

        let published = match self.publish_partial(job, output_dir) {
            Ok(published) => published,
            Err(e) => {
                // The stage failure stays the one reported
                warn!("Publishing partial results failed: {}", e);
                return Err(failure);
            }
        };

        Ok(Self::outcome(job, captions, published, Some(failure)))
    }

    // @publishes: Captions, plus the rendered video if it exists
    fn publish_partial(&self, job: &Job, output_dir: &Path) -> Result<PublishedArtifacts, CaptionError> {
        let mut published = self.publish_captions(job, output_dir)?;

        if let Some(rendered) = job.rendered_video().filter(|p| p.exists()) {
            let video_path = FileManager::generate_output_path(job.source(), output_dir, "_subtitled.mp4");
            FileManager::copy_file(rendered, &video_path)?;
            published.rendered_video = Some(video_path);
        }

        Ok(published)
    }

    fn outcome(
        job: &Job,
        captions: CaptionSet,
        published: PublishedArtifacts,
        failure: Option<JobFailure>,
    ) -> JobOutcome {
        JobOutcome {
            job_id: job.id(),
            task: job.task(),
            language: job.transcript().map(|t| t.language.clone()).unwrap_or_default(),
            source_video: job.source().to_path_buf(),
            final_state: job.state().clone(),
            captions,
            published,
            failure,
        }
    }
}
