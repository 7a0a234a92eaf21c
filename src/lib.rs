pub mod config;
pub mod engine;
pub mod error;
pub mod permission;
pub mod search;
pub mod session;
pub mod transcript;

pub use config::Config;
pub use engine::{
    RecognitionErrorKind, RecognitionEvent, RecognizerConfig, ScriptedBackend, SpeechBackend,
    SpeechBackendFactory, SpeechSource,
};
pub use error::CaptureError;
pub use permission::{CaptureStream, MediaCapture, PermissionGate, PermissionState, ProbeOutcome};
pub use search::{SearchConfig, SearchDispatcher, TabOpener};
pub use session::{CaptureSession, SessionConfig, SessionState, SessionStats, UiEvent};
pub use transcript::TranscriptBuffer;
