use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::CaptionError;

// @module: File and directory utilities

/// Container extensions accepted as input video
pub const ACCEPTED_VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), CaptionError> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @checks: Extension is one of the accepted video containers
    pub fn is_supported_video<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| ACCEPTED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Check that `path` is an existing, readable video we accept
    pub fn validate_input_video<P: AsRef<Path>>(path: P) -> Result<(), CaptionError> {
        let path = path.as_ref();

        if !Self::file_exists(path) || fs::File::open(path).is_err() {
            return Err(CaptionError::InputNotFound(path.to_path_buf()));
        }
        if !Self::is_supported_video(path) {
            return Err(CaptionError::UnsupportedInput(path.to_path_buf()));
        }

        Ok(())
    }

    // @generates: Output path `<output_dir>/<input file name><suffix>`
    //
    // The container extension stays in the name so `talk.mp4` and `talk.mkv`
    // publish to different files.
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
    ) -> PathBuf {
        let file_name = input_file.as_ref().file_name().unwrap_or_default();

        let mut output_filename = file_name.to_string_lossy().to_string();
        output_filename.push_str(suffix);

        output_dir.as_ref().join(output_filename)
    }

    /// Output directory for `input_file` found under `input_root`, mirroring
    /// its relative subdirectory below `output_root`
    pub fn mirrored_output_dir<P1: AsRef<Path>, P2: AsRef<Path>, P3: AsRef<Path>>(
        input_file: P1,
        input_root: P2,
        output_root: P3,
    ) -> PathBuf {
        let relative_parent = input_file
            .as_ref()
            .parent()
            .and_then(|parent| parent.strip_prefix(input_root.as_ref()).ok())
            .unwrap_or_else(|| Path::new(""));

        output_root.as_ref().join(relative_parent)
    }

    /// Find accepted video files under a directory, sorted by path
    pub fn find_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, CaptionError> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.map_err(|e| CaptionError::Io(e.into()))?;
            let path = entry.path();

            if path.is_file() && Self::is_supported_video(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), CaptionError> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)?;
        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<(), CaptionError> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(CaptionError::InputNotFound(from.to_path_buf()));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)?;
        Ok(())
    }
}
