//! Capture session management
//!
//! This module provides the `CaptureSession` abstraction that manages:
//! - Microphone permission gating before any listening starts
//! - The recognizer lifecycle, including transparent auto-restart after
//!   engine-forced ends
//! - Transcript assembly and live preview publication
//! - Search dispatch when the user stops the capture

mod config;
mod events;
pub mod reducer;
mod session;
mod stats;

pub use config::SessionConfig;
pub use events::{SessionState, UiEvent};
pub use session::CaptureSession;
pub use stats::SessionStats;
