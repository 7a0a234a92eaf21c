use serde::{Deserialize, Serialize};

/// Where the session is in its lifecycle.
///
/// Stopping is transient: a stop was requested and the session is waiting
/// for the engine's end signal before returning to Idle. While Stopping,
/// the auto-restart rule is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Listening,
    Stopping,
}

/// Events produced for the UI layer.
///
/// Delivered over an mpsc channel; the session never waits on the consumer.
/// A consumer that stops draining loses events rather than stalling capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// The live preview text changed (accumulated transcript + interim tail)
    PreviewChanged { text: String },
    /// The session entered or left the listening state
    ListeningStateChanged { listening: bool },
    /// Microphone access is missing; a persistent prompt should be shown
    PermissionPromptNeeded,
    /// A fatal, user-visible failure ended the session
    FatalError { message: String },
}
