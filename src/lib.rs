/*!
 * # autocaption - automatic video captioning
 *
 * A Rust library that turns the speech in a video into captions.
 *
 * ## Features
 *
 * - Extract the audio track of a video as 16 kHz mono PCM
 * - Recognize speech with a Whisper-style engine, in the spoken language
 *   or translated into English
 * - Render WebVTT and SRT captions with word-wrapped cue lines
 * - Plain-text transcript with one sentence per paragraph
 * - Burn the captions into a copy of the video
 * - Package everything into a single zip archive
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `captions`: Text wrapping, sentence splitting and caption formatting
 * - `recognition`: Speech recognition engines:
 *   - `recognition::whisper`: Whisper command line client
 *   - `recognition::mock`: Scripted engine for tests
 * - `media`: Audio extraction and subtitle burn-in:
 *   - `media::ffmpeg`: ffmpeg command line client
 *   - `media::mock`: Scripted transcoder for tests
 * - `pipeline`: Job state machine and the orchestrator driving it
 * - `packager`: Zip archive of the job's artifacts
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `process`: External tool invocation
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod packager;
pub mod pipeline;
pub mod process;
pub mod recognition;

// Re-export main types for easier usage
pub use app_config::Config;
pub use captions::{format_segments, format_timestamp, wrap_text, CaptionFormat, Segment, Transcript};
pub use errors::{CaptionError, JobFailure, PipelineStage};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use pipeline::{JobOutcome, JobState, Orchestrator, PipelineSettings};
pub use recognition::{Recognizer, Task};
