/*!
 * Mock recognizer for testing.
 *
 * - `MockRecognizer::working(transcript)` - always returns the transcript
 * - `MockRecognizer::failing()` - every recognition fails
 * - `MockRecognizer::unavailable()` - the availability check fails
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::captions::{Segment, Transcript};
use crate::errors::CaptionError;
use crate::recognition::{Recognizer, Task};

/// Behavior mode for the mock recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum MockRecognizerBehavior {
    /// Returns the transcript
    Working(Transcript),
    /// Recognition fails as if the engine crashed
    Failing,
    /// The engine cannot be launched
    Unavailable,
}

/// Scripted recognizer that counts its calls
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    behavior: MockRecognizerBehavior,
    calls: Arc<AtomicUsize>,
    last_task: Arc<Mutex<Option<Task>>>,
}

impl MockRecognizer {
    pub fn new(behavior: MockRecognizerBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            last_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn working(transcript: Transcript) -> Self {
        Self::new(MockRecognizerBehavior::Working(transcript))
    }

    pub fn failing() -> Self {
        Self::new(MockRecognizerBehavior::Failing)
    }

    pub fn unavailable() -> Self {
        Self::new(MockRecognizerBehavior::Unavailable)
    }

    /// Two-sentence English transcript
    pub fn sample_transcript() -> Transcript {
        Transcript::new(
            "en",
            " Hello world. How are you?",
            vec![
                Segment::new(0.0, 2.5, " Hello world."),
                Segment::new(2.5, 5.0, " How are you?"),
            ],
        )
    }

    /// Number of `recognize` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Task of the most recent `recognize` call
    pub fn last_task(&self) -> Option<Task> {
        self.last_task.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn check_available(&self) -> Result<(), CaptionError> {
        match self.behavior {
            MockRecognizerBehavior::Unavailable => Err(CaptionError::EngineUnavailable {
                tool: "mock-recognizer".to_string(),
                message: "Simulated missing engine".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn recognize(&self, _audio_path: &Path, task: Task) -> Result<Transcript, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_task.lock() {
            *guard = Some(task);
        }

        match &self.behavior {
            MockRecognizerBehavior::Working(transcript) => Ok(transcript.clone()),
            MockRecognizerBehavior::Failing => {
                Err(CaptionError::Recognition("Simulated engine crash".to_string()))
            }
            MockRecognizerBehavior::Unavailable => Err(CaptionError::EngineUnavailable {
                tool: "mock-recognizer".to_string(),
                message: "Simulated missing engine".to_string(),
            }),
        }
    }
}
