use thiserror::Error;

/// User-visible capture failures.
///
/// Transient recognition errors (no speech detected, unclassified engine
/// codes) never appear here; the session absorbs them and keeps listening.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone access is denied or was revoked. The caller should surface
    /// a persistent permission prompt; `start()` is blocked until granted.
    #[error("microphone permission is not granted")]
    Permission,

    /// The platform offers no speech capability. The feature stays disabled
    /// for the remainder of the session object's life; there is no retry.
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    /// Microphone hardware is unavailable. Fatal for the current session.
    #[error("audio device unavailable: {0}")]
    Device(String),

    /// Auto-restart after an engine-forced end failed. The session returns
    /// to idle and requires a manual restart.
    #[error("failed to restart recognition after engine-forced end: {0}")]
    RestartFailure(String),
}
