/*!
 * End-to-end pipeline tests against the mock recognizer and transcoder
 */

use std::sync::Arc;

use autocaption::captions::{Segment, Transcript};
use autocaption::errors::{CaptionError, PipelineStage};
use autocaption::media::mock::{MockTranscoder, MockTranscoderBehavior, MOCK_VIDEO_BYTES};
use autocaption::packager::ARCHIVE_ENTRIES;
use autocaption::pipeline::JobState;
use autocaption::recognition::mock::MockRecognizer;
use autocaption::recognition::Task;
use crate::common::{self, RecordingProgress, StageEvent};

const EXPECTED_SRT: &str = "1\n00:00:00,000 --> 00:00:02,500\nHello world.\n\n2\n00:00:02,500 --> 00:00:05,000\nHow are you?\n";
const EXPECTED_VTT: &str =
    "WEBVTT\n\n00:00:00.000 --> 00:00:02.500\nHello world.\n\n00:00:02.500 --> 00:00:05.000\nHow are you?\n";

/// Test a complete transcribe run
#[tokio::test]
async fn test_submit_withWorkingEngines_shouldPublishAllArtifacts() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let work_dir = temp_dir.path().join("work");
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, &work_dir);

    let outcome = orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.final_state, JobState::Done);
    assert_eq!(outcome.task, Task::Transcribe);
    assert_eq!(outcome.language, "en");
    assert_eq!(outcome.source_video, video);
    assert_eq!(outcome.captions.srt.body(), EXPECTED_SRT);
    assert_eq!(outcome.captions.vtt.body(), EXPECTED_VTT);
    assert_eq!(outcome.captions.transcript_text, "Hello world.\n\nHow are you?");

    let published = &outcome.published;
    assert_eq!(published.srt.as_deref(), Some(output_dir.join("talk.mp4.srt").as_path()));
    assert_eq!(std::fs::read_to_string(output_dir.join("talk.mp4.srt")).unwrap(), EXPECTED_SRT);
    assert_eq!(std::fs::read_to_string(output_dir.join("talk.mp4.vtt")).unwrap(), EXPECTED_VTT);
    assert_eq!(
        std::fs::read_to_string(output_dir.join("talk.mp4.txt")).unwrap(),
        "Hello world.\n\nHow are you?"
    );
    assert_eq!(std::fs::read(output_dir.join("talk.mp4_subtitled.mp4")).unwrap(), MOCK_VIDEO_BYTES);

    let archive = published.archive.clone().expect("archive should be published");
    assert_eq!(archive, output_dir.join("talk.mp4_transcripts_and_video.zip"));
    assert_eq!(common::archive_entry_names(&archive).unwrap(), ARCHIVE_ENTRIES.to_vec());
    assert_eq!(
        common::read_archive_entry(&archive, "transcript.srt").unwrap(),
        EXPECTED_SRT.as_bytes()
    );

    assert_eq!(transcoder.extract_calls(), 1);
    assert_eq!(transcoder.render_calls(), 1);
    assert_eq!(recognizer.call_count(), 1);
    assert_eq!(recognizer.last_task(), Some(Task::Transcribe));
}

/// Test that the translate task reaches the engine
#[tokio::test]
async fn test_submit_withTranslateTask_shouldPassTaskToEngine() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "interview.MKV").unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let outcome = orchestrator.submit(&video, "Translate", temp_dir.path()).await.unwrap();

    assert_eq!(outcome.task, Task::Translate);
    assert_eq!(recognizer.last_task(), Some(Task::Translate));
}

/// Test that an unknown task fails before any external call
#[tokio::test]
async fn test_submit_withUnknownTask_shouldFailWithoutExternalCalls() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "Summarize", temp_dir.path()).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Submission);
    assert!(matches!(failure.error, CaptionError::InvalidTask(ref task) if task == "Summarize"));
    assert_eq!(transcoder.extract_calls(), 0);
    assert_eq!(transcoder.render_calls(), 0);
    assert_eq!(recognizer.call_count(), 0);
}

/// Test missing and unsupported inputs
#[tokio::test]
async fn test_submit_withBadInput_shouldFailAtSubmission() {
    let temp_dir = common::create_temp_dir().unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let missing = temp_dir.path().join("missing.mp4");
    let failure = orchestrator.submit(&missing, "transcribe", temp_dir.path()).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Submission);
    assert!(matches!(failure.error, CaptionError::InputNotFound(_)));

    let notes = common::create_test_file(temp_dir.path(), "notes.txt", b"text").unwrap();
    let failure = orchestrator.submit(&notes, "transcribe", temp_dir.path()).await.unwrap_err();
    assert!(matches!(failure.error, CaptionError::UnsupportedInput(_)));

    assert_eq!(transcoder.extract_calls(), 0);
}

/// Test that a missing engine aborts before any stage
#[tokio::test]
async fn test_submit_withUnavailableEngine_shouldFailBeforeExtraction() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let recognizer = MockRecognizer::unavailable();
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "transcribe", temp_dir.path()).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Submission);
    assert!(matches!(failure.error, CaptionError::EngineUnavailable { .. }));
    assert_eq!(transcoder.extract_calls(), 0);

    let transcoder = MockTranscoder::new(MockTranscoderBehavior::Unavailable);
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());
    let failure = orchestrator.submit(&video, "transcribe", temp_dir.path()).await.unwrap_err();
    assert!(matches!(failure.error, CaptionError::EngineUnavailable { .. }));
}

/// Test that an unreadable container stops at extraction
#[tokio::test]
async fn test_submit_withExtractionFailure_shouldStopBeforeRecognition() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "broken.avi").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::new(MockTranscoderBehavior::FailExtraction);
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Extraction);
    assert!(failure.user_message().contains("extraction"));
    assert_eq!(recognizer.call_count(), 0);
    assert!(!output_dir.join("broken.avi.srt").exists());
}

/// Test that a recognition crash publishes nothing
#[tokio::test]
async fn test_submit_withRecognitionFailure_shouldNotRender() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mov").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::failing();
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Recognition);
    assert!(matches!(failure.error, CaptionError::Recognition(_)));
    assert_eq!(transcoder.render_calls(), 0);
    assert_eq!(common::count_dir_entries(&output_dir), 0);
}

/// Test that captions survive a render failure
#[tokio::test]
async fn test_submit_withRenderFailure_shouldStillPublishCaptions() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::new(MockTranscoderBehavior::FailRender);
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let outcome = orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap();

    assert!(!outcome.is_complete());
    assert!(matches!(outcome.final_state, JobState::Failed { stage: PipelineStage::Render, .. }));
    let failure = outcome.failure.as_ref().expect("render failure should be reported");
    assert_eq!(failure.stage, PipelineStage::Render);

    assert_eq!(std::fs::read_to_string(output_dir.join("talk.mp4.srt")).unwrap(), EXPECTED_SRT);
    assert_eq!(std::fs::read_to_string(output_dir.join("talk.mp4.vtt")).unwrap(), EXPECTED_VTT);
    assert!(output_dir.join("talk.mp4.txt").exists());
    assert!(outcome.published.archive.is_none());
    assert!(outcome.published.rendered_video.is_none());
    assert!(!output_dir.join("talk.mp4_transcripts_and_video.zip").exists());
}

/// Test that a render failure stays the reported cause when publishing also fails
#[tokio::test]
async fn test_submit_withRenderFailureAndUnwritableOutput_shouldReportRenderFailure() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let blocker = common::create_test_file(temp_dir.path(), "blocker", b"not a directory").unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::new(MockTranscoderBehavior::FailRender);
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "transcribe", &blocker.join("out")).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Render);
    assert!(matches!(failure.error, CaptionError::Render(_)));
}

/// Test that a publish failure after a successful render fails the job at packaging
#[tokio::test]
async fn test_submit_withUnwritableOutput_shouldFailAtPackaging() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let blocker = common::create_test_file(temp_dir.path(), "blocker", b"not a directory").unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let failure = orchestrator.submit(&video, "transcribe", &blocker.join("out")).await.unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Packaging);
    assert!(matches!(failure.error, CaptionError::Io(_)));
}

/// Test that a missing rendered video never yields a degraded archive
#[tokio::test]
async fn test_submit_withRenderProducingNoFile_shouldFailPackaging() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::new(MockTranscoderBehavior::SilentRender);
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let outcome = orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap();

    let failure = outcome.failure.as_ref().expect("packaging failure should be reported");
    assert_eq!(failure.stage, PipelineStage::Packaging);
    assert!(matches!(failure.error, CaptionError::Packaging(_)));
    assert!(matches!(outcome.final_state, JobState::Failed { stage: PipelineStage::Packaging, .. }));
    assert!(outcome.published.srt.is_some());
    assert!(!output_dir.join("talk.mp4_transcripts_and_video.zip").exists());
}

/// Test that job workspaces are removed after success and failure
#[tokio::test]
async fn test_submit_afterCompletion_shouldRemoveJobWorkspace() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let work_dir = temp_dir.path().join("work");
    let output_dir = temp_dir.path().join("out");

    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, &work_dir);
    orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap();
    assert_eq!(common::count_dir_entries(&work_dir), 0);

    let failing = MockRecognizer::failing();
    let orchestrator = common::build_orchestrator(&failing, &transcoder, &work_dir);
    orchestrator.submit(&video, "transcribe", &output_dir).await.unwrap_err();
    assert_eq!(common::count_dir_entries(&work_dir), 0);
}

/// Test that concurrent jobs do not share artifacts
#[tokio::test]
async fn test_submit_concurrentJobs_shouldStayIsolated() {
    let temp_dir = common::create_temp_dir().unwrap();
    let first = common::create_test_video(temp_dir.path(), "first.mp4").unwrap();
    let second = common::create_test_video(temp_dir.path(), "second.mp4").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let (a, b) = tokio::join!(
        orchestrator.submit(&first, "transcribe", &output_dir),
        orchestrator.submit(&second, "translate", &output_dir),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.job_id, b.job_id);
    assert!(a.is_complete() && b.is_complete());
    assert!(output_dir.join("first.mp4_transcripts_and_video.zip").exists());
    assert!(output_dir.join("second.mp4_transcripts_and_video.zip").exists());
    assert_eq!(transcoder.extract_calls(), 2);
}

/// Test that concurrent jobs over same-named videos publish separately
#[tokio::test]
async fn test_submit_concurrentSameStemJobs_shouldPublishSeparately() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mp4 = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let mkv = common::create_test_video(temp_dir.path(), "talk.mkv").unwrap();
    let output_dir = temp_dir.path().join("out");
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let orchestrator = common::build_orchestrator(&recognizer, &transcoder, temp_dir.path());

    let (a, b) = tokio::join!(
        orchestrator.submit(&mp4, "transcribe", &output_dir),
        orchestrator.submit(&mkv, "transcribe", &output_dir),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.published.archive, b.published.archive);
    assert!(output_dir.join("talk.mp4_transcripts_and_video.zip").exists());
    assert!(output_dir.join("talk.mkv_transcripts_and_video.zip").exists());
    assert!(output_dir.join("talk.mp4.srt").exists());
    assert!(output_dir.join("talk.mkv.srt").exists());
}

/// Test stage notifications in pipeline order
#[tokio::test]
async fn test_submit_withProgressReporter_shouldReportStagesInOrder() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let recognizer = MockRecognizer::working(MockRecognizer::sample_transcript());
    let transcoder = MockTranscoder::working();
    let progress = Arc::new(RecordingProgress::default());
    let orchestrator =
        common::build_orchestrator(&recognizer, &transcoder, temp_dir.path()).with_progress(progress.clone());

    orchestrator.submit(&video, "transcribe", &temp_dir.path().join("out")).await.unwrap();

    let mut expected = Vec::new();
    for stage in [
        PipelineStage::Extraction,
        PipelineStage::Recognition,
        PipelineStage::CueBuilding,
        PipelineStage::Render,
        PipelineStage::Packaging,
    ] {
        expected.push(StageEvent::Started(stage));
        expected.push(StageEvent::Finished(stage));
    }
    assert_eq!(progress.events(), expected);
}

/// Test that line width settings reach the caption documents
#[tokio::test]
async fn test_submit_withNarrowLineWidth_shouldWrapCaptions() {
    let temp_dir = common::create_temp_dir().unwrap();
    let video = common::create_test_video(temp_dir.path(), "talk.mp4").unwrap();
    let transcript = Transcript::new(
        "de",
        " Guten Morgen zusammen.",
        vec![Segment::new(0.0, 1.5, " Guten Morgen zusammen.")],
    );
    let recognizer = MockRecognizer::working(transcript);
    let transcoder = MockTranscoder::working();
    let settings = autocaption::pipeline::PipelineSettings {
        work_dir: temp_dir.path().to_path_buf(),
        max_line_width: 12,
    };
    let orchestrator = autocaption::pipeline::Orchestrator::new(
        Arc::new(recognizer.clone()),
        Arc::new(transcoder.clone()),
        settings,
    );

    let outcome = orchestrator.submit(&video, "transcribe", temp_dir.path()).await.unwrap();

    assert_eq!(outcome.language, "de");
    assert_eq!(
        outcome.captions.srt.body(),
        "1\n00:00:00,000 --> 00:00:01,500\nGuten Morgen\nzusammen.\n"
    );
}
