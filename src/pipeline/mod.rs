/*!
 * End-to-end captioning jobs.
 *
 * - `job`: job state machine and its private workspace
 * - `orchestrator`: runs a job through extraction, recognition, cue
 *   building, burn-in and packaging
 * - `progress`: advisory stage notifications
 */

pub use self::job::{CaptionSet, Job, JobPaths, JobState};
pub use self::orchestrator::{JobOutcome, Orchestrator, PipelineSettings, PublishedArtifacts};
pub use self::progress::{NoProgress, ProgressReporter};

pub mod job;
pub mod orchestrator;
pub mod progress;
