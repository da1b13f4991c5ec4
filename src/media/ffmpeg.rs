use async_trait::async_trait;
use log::{error, info};
use std::path::Path;

use crate::app_config::TranscoderConfig;
use crate::errors::CaptionError;
use crate::media::{Transcoder, RECOGNITION_SAMPLE_RATE};
use crate::process::{check_tool, run_tool};

// @module: ffmpeg-backed transcoder

// @struct: Runs the configured ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Arguments converting the input's audio to recognition-ready PCM
    pub fn extract_audio_args(video: &Path, audio_out: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            RECOGNITION_SAMPLE_RATE.to_string(),
            audio_out.to_string_lossy().to_string(),
        ]
    }

    /// Arguments burning `srt_path` into the picture and remuxing `audio`
    pub fn burn_subtitles_args(video: &Path, audio: &Path, srt_path: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-i".to_string(),
            audio.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-vf".to_string(),
            format!("subtitles=filename={}", escape_filter_path(srt_path)),
            "-c:a".to_string(),
            "aac".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

/// Escape a path for use as a filter option value inside a filtergraph.
///
/// Two levels apply: the option value (`\`, `'`, `:`) and the filtergraph
/// description (`\`, `'`, `[`, `]`, `,`, `;`).
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();

    let mut value = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            value.push('\\');
        }
        value.push(c);
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn check_available(&self) -> Result<(), CaptionError> {
        check_tool(&self.config.ffmpeg_path, "-version").await
    }

    async fn extract_audio(&self, video: &Path, audio_out: &Path) -> Result<(), CaptionError> {
        info!("Extracting audio from {}", video.display());

        let args = Self::extract_audio_args(video, audio_out);
        run_tool(&self.config.ffmpeg_path, &args).await.map_err(|e| {
            error!("Audio extraction failed: {}", e);
            CaptionError::Extraction(e)
        })?;

        if !audio_out.exists() {
            return Err(CaptionError::Extraction(format!(
                "ffmpeg reported success but {} was not written",
                audio_out.display()
            )));
        }

        Ok(())
    }

    async fn burn_subtitles(
        &self,
        video: &Path,
        audio: &Path,
        srt_path: &Path,
        output: &Path,
    ) -> Result<(), CaptionError> {
        info!("Burning captions into {}", output.display());

        let args = Self::burn_subtitles_args(video, audio, srt_path, output);
        run_tool(&self.config.ffmpeg_path, &args).await.map_err(|e| {
            error!("Caption burn-in failed: {}", e);
            CaptionError::Render(e)
        })?;

        if !output.exists() {
            return Err(CaptionError::Render(format!(
                "ffmpeg reported success but {} was not written",
                output.display()
            )));
        }

        Ok(())
    }
}
