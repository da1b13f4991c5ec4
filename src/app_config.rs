use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::captions::DEFAULT_MAX_LINE_WIDTH;

/// Application configuration module
/// This module handles loading, validating and saving the settings for the
/// recognition engine, the transcoder and caption rendering.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech recognition engine settings
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Media transcoder settings
    #[serde(default)]
    pub transcoder: TranscoderConfig,

    /// Caption rendering settings
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Parent directory for per-job workspaces (system temp dir when unset)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Where results are published (input file's directory when unset)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Recognition engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognitionConfig {
    // @field: Engine executable
    #[serde(default = "default_engine_path")]
    pub engine_path: String,

    // @field: Model name passed to the engine
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Compute device ("cpu", "cuda"); engine default when unset
    #[serde(default)]
    pub device: Option<String>,

    // @field: Candidates sampled per segment
    #[serde(default = "default_best_of")]
    pub best_of: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            model: default_model(),
            device: None,
            best_of: default_best_of(),
        }
    }
}

/// Transcoder configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscoderConfig {
    // @field: ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// Caption rendering configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Maximum characters per caption line
    #[serde(default = "default_max_line_width")]
    pub max_line_width: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_line_width: default_max_line_width(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_engine_path() -> String {
    "whisper".to_string()
}

fn default_model() -> String {
    "small".to_string()
}

fn default_best_of() -> u32 {
    5
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_max_line_width() -> usize {
    DEFAULT_MAX_LINE_WIDTH
}

impl Config {
    /// Load a configuration file, or write and return the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.recognition.engine_path.trim().is_empty() {
            return Err(anyhow!("Recognition engine path must not be empty"));
        }
        if self.recognition.model.trim().is_empty() {
            return Err(anyhow!("Recognition model name must not be empty"));
        }
        if self.recognition.best_of == 0 {
            return Err(anyhow!("best_of must be at least 1"));
        }
        if self.transcoder.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("ffmpeg path must not be empty"));
        }
        if self.captions.max_line_width == 0 {
            return Err(anyhow!("max_line_width must be greater than 0"));
        }

        Ok(())
    }

    /// Workspace parent directory for jobs
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Output directory for a given input file
    pub fn resolved_output_dir(&self, input_file: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input_file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            recognition: RecognitionConfig::default(),
            transcoder: TranscoderConfig::default(),
            captions: CaptionConfig::default(),
            work_dir: None,
            output_dir: None,
            log_level: LogLevel::default(),
        }
    }
}
