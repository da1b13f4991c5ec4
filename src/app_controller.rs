use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::PipelineStage;
use crate::file_utils::FileManager;
use crate::media::{FfmpegTranscoder, Transcoder};
use crate::pipeline::{JobOutcome, Orchestrator, PipelineSettings, ProgressReporter};
use crate::recognition::{shared_recognizer, Recognizer, Task};

// @module: Application controller for captioning videos

/// Shows the running stage on a spinner
struct StageSpinner {
    bar: ProgressBar,
}

impl ProgressReporter for StageSpinner {
    fn stage_started(&self, stage: PipelineStage) {
        let message = match stage {
            PipelineStage::Extraction => "Extracting audio...",
            PipelineStage::Recognition => "Recognizing speech...",
            PipelineStage::CueBuilding => "Building captions...",
            PipelineStage::Render => "Generating subtitled video...",
            PipelineStage::Packaging => "Packaging results...",
            PipelineStage::Submission => "Checking input...",
        };
        self.bar.set_message(message);
    }

    fn stage_finished(&self, stage: PipelineStage) {
        self.bar.set_message(format!("Finished {}", stage));
    }
}

/// Summary of a folder run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub partial: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    orchestrator: Orchestrator,
    multi_progress: MultiProgress,
    spinner: ProgressBar,
}

impl Controller {
    // @method: Create a controller using the whisper CLI and ffmpeg from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let recognizer = shared_recognizer(&config.recognition);
        let transcoder: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
        Self::with_components(config, recognizer, transcoder)
    }

    /// Create a controller around explicit engine and transcoder instances
    pub fn with_components(
        config: Config,
        recognizer: Arc<dyn Recognizer>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Result<Self> {
        config.validate()?;

        let multi_progress = MultiProgress::new();
        let spinner = multi_progress.add(ProgressBar::new_spinner());
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);

        let settings = PipelineSettings {
            work_dir: config.resolved_work_dir(),
            max_line_width: config.captions.max_line_width,
        };
        let orchestrator = Orchestrator::new(recognizer, transcoder, settings)
            .with_progress(Arc::new(StageSpinner { bar: spinner.clone() }));

        Ok(Self {
            config,
            orchestrator,
            multi_progress,
            spinner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Archive path a run over `input_file` publishes
    pub fn archive_path(&self, input_file: &Path) -> PathBuf {
        let output_dir = self.config.resolved_output_dir(input_file);
        FileManager::generate_output_path(input_file, output_dir, "_transcripts_and_video.zip")
    }

    /// Caption a single video file
    ///
    /// Returns `Ok(None)` when results already exist and `force_overwrite` is off.
    pub async fn run(&self, input_file: &Path, task: Task, force_overwrite: bool) -> Result<Option<JobOutcome>> {
        let output_dir = self.config.resolved_output_dir(input_file);
        self.run_into(input_file, task, force_overwrite, &output_dir).await
    }

    // @runs: One job publishing into `output_dir`
    async fn run_into(
        &self,
        input_file: &Path,
        task: Task,
        force_overwrite: bool,
        output_dir: &Path,
    ) -> Result<Option<JobOutcome>> {
        let archive_path = FileManager::generate_output_path(input_file, output_dir, "_transcripts_and_video.zip");
        if archive_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, results already exist (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(None);
        }

        FileManager::ensure_dir(output_dir)?;

        self.spinner.reset();
        self.spinner.enable_steady_tick(Duration::from_millis(120));
        let result = self.orchestrator.run(input_file, task, output_dir).await;
        self.spinner.disable_steady_tick();
        self.spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                Self::report(&outcome);
                Ok(Some(outcome))
            }
            Err(failure) => {
                error!("{}", failure.user_message());
                Err(anyhow!(failure))
            }
        }
    }

    // @returns: Where a video found under `input_dir` publishes its results
    fn folder_output_dir(&self, input_dir: &Path, video_file: &Path) -> PathBuf {
        match &self.config.output_dir {
            // Shared output dir: keep the input tree's layout
            Some(output_root) => FileManager::mirrored_output_dir(video_file, input_dir, output_root),
            None => self.config.resolved_output_dir(video_file),
        }
    }

    /// Caption every accepted video under `input_dir`, continuing after failures
    pub async fn run_folder(&self, input_dir: &Path, task: Task, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let video_files = FileManager::find_videos(input_dir)?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {:?}", input_dir));
        }

        let folder_pb = self.multi_progress.insert(0, ProgressBar::new(video_files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style);

        let mut summary = FolderSummary::default();

        for video_file in &video_files {
            let file_name = video_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = self.folder_output_dir(input_dir, video_file);
            match self.run_into(video_file, task, force_overwrite, &output_dir).await {
                Ok(Some(outcome)) if outcome.is_complete() => summary.processed += 1,
                Ok(Some(_)) => summary.partial += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} partial, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.partial,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    // @logs: Where the results went
    fn report(outcome: &JobOutcome) {
        let published = &outcome.published;
        info!("Original video: {}", outcome.source_video.display());
        for (label, path) in [
            ("Transcript", &published.transcript),
            ("VTT captions", &published.vtt),
            ("SRT captions", &published.srt),
            ("Subtitled video", &published.rendered_video),
            ("Download archive", &published.archive),
        ] {
            if let Some(path) = path {
                info!("{}: {}", label, path.display());
            }
        }

        if let Some(failure) = &outcome.failure {
            warn!("{}", failure.user_message());
        }
    }

    // @formats: Duration as a short human readable string
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
