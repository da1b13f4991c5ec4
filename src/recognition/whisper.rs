/*!
 * Recognizer backed by the whisper command-line tool.
 *
 * The tool is run once per job with JSON output written next to the audio
 * file, then the JSON is parsed into a `Transcript`.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::app_config::RecognitionConfig;
use crate::captions::Transcript;
use crate::errors::CaptionError;
use crate::process::{check_tool, run_tool};
use crate::recognition::{Recognizer, Task};

/// whisper CLI recognizer
#[derive(Debug, Clone)]
pub struct WhisperRecognizer {
    config: RecognitionConfig,
}

impl WhisperRecognizer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Arguments for one recognition run
    pub fn build_args(&self, audio_path: &Path, task: Task, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--task".to_string(),
            task.as_str().to_string(),
            "--best_of".to_string(),
            self.config.best_of.to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(device) = &self.config.device {
            args.push("--device".to_string());
            args.push(device.clone());
        }

        args
    }

    // @returns: Path of the JSON file whisper writes for `audio_path`
    fn json_output_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
        let stem = audio_path.file_stem().unwrap_or_default();
        let mut name = stem.to_os_string();
        name.push(".json");
        output_dir.join(name)
    }

    /// Parse whisper's JSON output
    pub fn parse_output(json: &str) -> Result<Transcript, CaptionError> {
        serde_json::from_str::<Transcript>(json)
            .map_err(|e| CaptionError::Recognition(format!("Failed to parse engine output: {}", e)))
    }
}

#[async_trait]
impl Recognizer for WhisperRecognizer {
    async fn check_available(&self) -> Result<(), CaptionError> {
        check_tool(&self.config.engine_path, "--help").await
    }

    async fn recognize(&self, audio_path: &Path, task: Task) -> Result<Transcript, CaptionError> {
        let output_dir = audio_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        info!("Running {} (model {}, task {})", self.config.engine_path, self.config.model, task);

        let args = self.build_args(audio_path, task, &output_dir);
        run_tool(&self.config.engine_path, &args)
            .await
            .map_err(CaptionError::Recognition)?;

        let json_path = Self::json_output_path(audio_path, &output_dir);
        let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            CaptionError::Recognition(format!("Engine output missing at {}: {}", json_path.display(), e))
        })?;

        let transcript = Self::parse_output(&json)?;
        debug!(
            "Engine returned {} segments, language '{}'",
            transcript.segments.len(),
            transcript.language
        );

        Ok(transcript)
    }
}
