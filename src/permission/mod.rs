//! Microphone permission gate
//!
//! Tracks whether the user has granted microphone access and owns the two
//! ways of finding out: a silent probe (transient capture, released
//! immediately) and an explicit user-facing request. No state is retained
//! beyond the enum; nothing is persisted across sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Microphone permission as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// Not yet determined, or the platform wants to prompt the user first
    Unknown,
    /// Access granted; listening may start
    Granted,
    /// Access denied or revoked; a persistent prompt should be shown
    Denied,
}

impl Default for PermissionState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A live capture handle. Dropping it releases the microphone.
pub trait CaptureStream: Send {}

/// What a permission probe found
pub enum ProbeOutcome {
    /// Access is granted; the transient stream must be released by the caller
    Granted(Box<dyn CaptureStream>),
    /// Access is denied
    Denied,
    /// The platform will not decide without prompting the user
    PromptRequired,
}

/// Media capture capability trait
///
/// Wraps whatever grants microphone access on the platform. The microphone
/// is exclusively held: probes are acquired and released synchronously
/// around permission checks, before any listening capture begins.
#[async_trait::async_trait]
pub trait MediaCapture: Send + Sync {
    /// Attempt a transient capture to discover the permission state
    async fn probe(&self) -> ProbeOutcome;

    /// Explicitly prompt the user for microphone access
    ///
    /// Returns whether access was granted.
    async fn request(&self) -> bool;
}

/// Tracks microphone permission for the capture session
pub struct PermissionGate {
    capture: Arc<dyn MediaCapture>,
    state: PermissionState,
}

impl PermissionGate {
    pub fn new(capture: Arc<dyn MediaCapture>) -> Self {
        Self {
            capture,
            state: PermissionState::Unknown,
        }
    }

    /// Probe the current permission state without prompting.
    ///
    /// The probe's capture stream is released immediately regardless of
    /// outcome; a prompt-required answer leaves the state unknown.
    pub async fn check(&mut self) -> PermissionState {
        self.state = match self.capture.probe().await {
            ProbeOutcome::Granted(stream) => {
                drop(stream);
                PermissionState::Granted
            }
            ProbeOutcome::Denied => PermissionState::Denied,
            ProbeOutcome::PromptRequired => PermissionState::Unknown,
        };
        info!("Microphone permission check: {:?}", self.state);
        self.state
    }

    /// Prompt the user for microphone access
    pub async fn request(&mut self) -> PermissionState {
        self.state = if self.capture.request().await {
            info!("Microphone permission granted");
            PermissionState::Granted
        } else {
            warn!("Microphone permission denied by user");
            PermissionState::Denied
        };
        self.state
    }

    /// Record a denial observed outside a probe, e.g. a revocation the
    /// engine reported mid-session
    pub fn mark_denied(&mut self) {
        self.state = PermissionState::Denied;
    }

    /// Last observed permission state
    pub fn state(&self) -> PermissionState {
        self.state
    }
}
