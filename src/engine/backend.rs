use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Configuration handed to the recognizer when a session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// BCP-47 locale tag the engine should recognize (e.g. "en-US")
    pub locale: String,
    /// Keep recognizing across pauses instead of stopping after one utterance
    pub continuous: bool,
    /// Deliver provisional (interim) results before they are finalized
    pub interim_results: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// Why the engine reported an error mid-session.
///
/// Classification drives session policy: permission problems re-prompt,
/// device problems are fatal, everything else is absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionErrorKind {
    /// Microphone access was denied or revoked while listening
    PermissionDenied,
    /// The engine heard nothing it could recognize (non-fatal)
    NoSpeech,
    /// No usable microphone hardware
    DeviceUnavailable,
    /// Any other engine-specific code, carried for logging
    Other(String),
}

/// A single signal from the speech engine.
///
/// Engines re-deliver the entire result sequence from session start on every
/// callback, re-sending already-finalized entries; `index` is the entry's
/// position in that sequence, and the transcript buffer's index gate is what
/// keeps the repeats from double-counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionEvent {
    /// Provisional text the engine may still revise
    Partial { index: usize, text: String },
    /// Text the engine will not revise further
    Final { index: usize, text: String },
    /// An engine error signal; the session classifies it
    Error(RecognitionErrorKind),
    /// The engine terminated the recognition session (its own forced limit
    /// or a requested stop)
    Ended,
}

/// Speech recognition backend trait
///
/// Implementations wrap whatever engine the platform offers. The session
/// owns exactly one backend and is the only caller of `start`/`stop`; the
/// state machine, not locking, enforces single active recognition.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Begin a recognition session
    ///
    /// Returns a channel receiver that will receive recognition events.
    /// Called again after an engine-forced end to restart transparently.
    async fn start(&mut self, config: &RecognizerConfig) -> Result<mpsc::Receiver<RecognitionEvent>>;

    /// Ask the engine to stop; quiescence is confirmed by a later `Ended`
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend currently has an active recognition session
    fn is_active(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Speech backend factory
pub struct SpeechBackendFactory;

impl SpeechBackendFactory {
    /// Create a speech backend for the given source
    pub fn create(source: SpeechSource) -> Result<Box<dyn SpeechBackend>> {
        match source {
            SpeechSource::Platform => {
                // A native engine is an external collaborator; none ships
                // with this crate, so the platform arm reports the same
                // condition a browser without speech support would.
                Err(CaptureError::Unsupported.into())
            }

            SpeechSource::Scripted(script) => {
                use super::scripted::ScriptedBackend;
                Ok(Box::new(ScriptedBackend::new(script)))
            }
        }
    }
}

/// Where recognition events come from
pub enum SpeechSource {
    /// The platform's own speech engine, when one exists
    Platform,
    /// A pre-scripted sequence of events (demos, batch replay, tests)
    Scripted(Vec<Vec<RecognitionEvent>>),
}
