pub mod backend;
pub mod scripted;

pub use backend::{
    RecognitionErrorKind, RecognitionEvent, RecognizerConfig, SpeechBackend,
    SpeechBackendFactory, SpeechSource,
};
pub use scripted::ScriptedBackend;
