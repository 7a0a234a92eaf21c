//! Pure control decisions for the session state machine
//!
//! The engine's callbacks arrive as events; what the session does in
//! response is decided here, with no engine and no I/O, so the policy is
//! testable with synthetic inputs.

use crate::engine::RecognitionErrorKind;
use crate::error::CaptureError;

use super::events::SessionState;

/// What to do when the engine's end signal arrives
#[derive(Debug, PartialEq, Eq)]
pub enum EndAction {
    /// The platform cut the session short; restart without touching the
    /// transcript so the interruption is invisible to the user
    Restart,
    /// A stop was requested (or the session already left Listening);
    /// finalize and return to Idle
    Finish,
}

/// The auto-restart rule: restart exactly when the session is still
/// Listening and no stop was requested.
pub fn end_action(state: SessionState, stop_requested: bool) -> EndAction {
    if state == SessionState::Listening && !stop_requested {
        EndAction::Restart
    } else {
        EndAction::Finish
    }
}

/// What to do with an engine error signal
#[derive(Debug)]
pub enum ErrorAction {
    /// Expected noise (no speech detected); keep listening, surface nothing
    Ignore,
    /// Unclassified engine code; log it and keep listening
    LogOnly,
    /// Microphone access went away mid-session; end the session and
    /// re-prompt for permission
    RepromptPermission,
    /// Hardware failure; end the session and alert the user
    Fatal(CaptureError),
}

pub fn classify_error(kind: &RecognitionErrorKind) -> ErrorAction {
    match kind {
        RecognitionErrorKind::PermissionDenied => ErrorAction::RepromptPermission,
        RecognitionErrorKind::NoSpeech => ErrorAction::Ignore,
        RecognitionErrorKind::DeviceUnavailable => {
            ErrorAction::Fatal(CaptureError::Device("no microphone available".to_string()))
        }
        RecognitionErrorKind::Other(_) => ErrorAction::LogOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_end_while_listening_restarts() {
        assert_eq!(end_action(SessionState::Listening, false), EndAction::Restart);
    }

    #[test]
    fn test_requested_stop_suppresses_restart() {
        assert_eq!(end_action(SessionState::Stopping, true), EndAction::Finish);
        // Even a stale Listening state finishes once a stop was requested
        assert_eq!(end_action(SessionState::Listening, true), EndAction::Finish);
    }

    #[test]
    fn test_end_after_idle_never_restarts() {
        assert_eq!(end_action(SessionState::Idle, false), EndAction::Finish);
    }

    #[test]
    fn test_no_speech_is_absorbed() {
        assert!(matches!(
            classify_error(&RecognitionErrorKind::NoSpeech),
            ErrorAction::Ignore
        ));
    }

    #[test]
    fn test_unknown_codes_are_logged_only() {
        assert!(matches!(
            classify_error(&RecognitionErrorKind::Other("network".to_string())),
            ErrorAction::LogOnly
        ));
    }

    #[test]
    fn test_device_loss_is_fatal() {
        assert!(matches!(
            classify_error(&RecognitionErrorKind::DeviceUnavailable),
            ErrorAction::Fatal(CaptureError::Device(_))
        ));
    }
}
