//! Helpers for launching the external tools (recognition engine, ffmpeg).
//!
//! No timeout is applied here: a launched tool runs until it exits.

use std::ffi::OsStr;
use std::process::{Output, Stdio};

use log::debug;
use tokio::process::Command;

use crate::errors::CaptionError;

/// Check that `program` can be launched by running it with `check_arg`.
///
/// Only a launch failure counts as unavailable; the exit status is ignored
/// because some tools exit non-zero for help/version flags.
pub async fn check_tool(program: &str, check_arg: &str) -> Result<(), CaptionError> {
    Command::new(program)
        .arg(check_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|_| ())
        .map_err(|e| CaptionError::EngineUnavailable {
            tool: program.to_string(),
            message: e.to_string(),
        })
}

/// Run `program` to completion and capture its output.
///
/// Returns the captured output on success, or a message describing the
/// launch error or the non-zero exit (with filtered stderr).
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    debug!("Running {:?}", command.as_std());

    let output = command
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            filter_tool_stderr(&stderr)
        ));
    }

    Ok(output)
}

/// Filter tool stderr down to meaningful lines, stripping the ffmpeg version
/// banner, build configuration and stream metadata noise.
pub fn filter_tool_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "encoder",
        "major_brand",
        "minor_version",
        "compatible_brands",
        "creation_time",
        "handler_name",
        "vendor_id",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
