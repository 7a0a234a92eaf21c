use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::{RecognitionEvent, RecognizerConfig, SpeechBackend};
use crate::error::CaptureError;
use crate::permission::{MediaCapture, PermissionGate, PermissionState};
use crate::search::{SearchConfig, SearchDispatcher, TabOpener};
use crate::transcript::TranscriptBuffer;

use super::config::SessionConfig;
use super::events::{SessionState, UiEvent};
use super::reducer::{classify_error, end_action, EndAction, ErrorAction};
use super::stats::SessionStats;

/// A capture session that manages permission, the recognizer lifecycle,
/// transcript assembly and search dispatch
pub struct CaptureSession {
    /// Session configuration
    config: SessionConfig,

    /// The one recognizer this session is allowed to run
    backend: Arc<Mutex<Box<dyn SpeechBackend>>>,

    /// Microphone permission tracker
    gate: Arc<Mutex<PermissionGate>>,

    /// Outbound search dispatch
    dispatcher: Arc<SearchDispatcher>,

    /// Lifecycle state; the state machine is what keeps recognition single
    state: Arc<Mutex<SessionState>>,

    /// Set by `stop()`; suppresses the auto-restart rule
    stop_requested: Arc<AtomicBool>,

    /// Latched when the platform reports no speech capability
    speech_disabled: Arc<AtomicBool>,

    /// Accumulated transcript, reset on every `start()`
    buffer: Arc<Mutex<TranscriptBuffer>>,

    /// Events for the UI layer
    events_tx: mpsc::Sender<UiEvent>,

    /// Handle for the engine event loop task
    loop_handle: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// When the current capture started
    started_at: Arc<Mutex<DateTime<Utc>>>,

    /// Engine-forced ends absorbed so far in this capture
    restarts: Arc<AtomicUsize>,
}

impl CaptureSession {
    /// Create a new capture session around the platform capabilities.
    ///
    /// Returns the session plus the receiver for its UI events.
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn SpeechBackend>,
        capture: Arc<dyn MediaCapture>,
        opener: Arc<dyn TabOpener>,
        search: SearchConfig,
    ) -> (Self, mpsc::Receiver<UiEvent>) {
        let (events_tx, events_rx) = mpsc::channel(100);

        let session = Self {
            config,
            backend: Arc::new(Mutex::new(backend)),
            gate: Arc::new(Mutex::new(PermissionGate::new(capture))),
            dispatcher: Arc::new(SearchDispatcher::new(opener, search)),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            speech_disabled: Arc::new(AtomicBool::new(false)),
            buffer: Arc::new(Mutex::new(TranscriptBuffer::new())),
            events_tx,
            loop_handle: Arc::new(Mutex::new(None)),
            started_at: Arc::new(Mutex::new(Utc::now())),
            restarts: Arc::new(AtomicUsize::new(0)),
        };

        (session, events_rx)
    }

    /// Start listening.
    ///
    /// No-op while a capture is already active. Fails with
    /// `CaptureError::Permission` when microphone access is missing (also
    /// emitting `PermissionPromptNeeded`), and with
    /// `CaptureError::Unsupported` when the platform has no speech engine,
    /// which disables the feature for the life of this session object.
    pub async fn start(&self) -> Result<()> {
        if self.speech_disabled.load(Ordering::SeqCst) {
            return Err(CaptureError::Unsupported.into());
        }

        let mut state = self.state.lock().await;
        if *state != SessionState::Idle {
            warn!("Capture already active; ignoring start");
            return Ok(());
        }

        // Listening is entered only with permission granted
        let permission = {
            let mut gate = self.gate.lock().await;
            match gate.state() {
                PermissionState::Granted => PermissionState::Granted,
                _ => gate.check().await,
            }
        };
        if permission != PermissionState::Granted {
            self.emit(UiEvent::PermissionPromptNeeded);
            return Err(CaptureError::Permission.into());
        }

        // Fresh transcript for the new session
        self.buffer.lock().await.reset();
        self.stop_requested.store(false, Ordering::SeqCst);
        self.restarts.store(0, Ordering::SeqCst);

        let rx = {
            let mut backend = self.backend.lock().await;
            match backend.start(&self.config.recognizer).await {
                Ok(rx) => rx,
                Err(e) => {
                    if matches!(
                        e.downcast_ref::<CaptureError>(),
                        Some(CaptureError::Unsupported)
                    ) {
                        self.speech_disabled.store(true, Ordering::SeqCst);
                    }
                    return Err(e.context("Failed to start recognition"));
                }
            }
        };

        *state = SessionState::Listening;
        *self.started_at.lock().await = Utc::now();
        drop(state);

        info!(
            "Capture session started: {} (locale={})",
            self.config.session_id, self.config.recognizer.locale
        );

        self.emit(UiEvent::ListeningStateChanged { listening: true });

        let event_loop = EventLoop {
            recognizer: self.config.recognizer.clone(),
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            stop_requested: Arc::clone(&self.stop_requested),
            buffer: Arc::clone(&self.buffer),
            gate: Arc::clone(&self.gate),
            dispatcher: Arc::clone(&self.dispatcher),
            events_tx: self.events_tx.clone(),
            restarts: Arc::clone(&self.restarts),
        };

        let handle = tokio::spawn(event_loop.run(rx));
        {
            let mut slot = self.loop_handle.lock().await;
            *slot = Some(handle);
        }

        Ok(())
    }

    /// Request a stop.
    ///
    /// Idempotent: repeated calls while already idle or stopping are no-ops.
    /// The actual transition to Idle (and the search dispatch) happens when
    /// the engine's end signal arrives.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            match *state {
                SessionState::Idle => {
                    debug!("Stop ignored; no active capture");
                    return Ok(());
                }
                SessionState::Stopping => {
                    debug!("Stop already in progress");
                    return Ok(());
                }
                SessionState::Listening => {
                    self.stop_requested.store(true, Ordering::SeqCst);
                    *state = SessionState::Stopping;
                }
            }
        }

        info!("Stop requested; waiting for the engine's end signal");

        let stopped = self.backend.lock().await.stop().await;
        if let Err(e) = stopped {
            // The engine never received the stop request, so its end signal
            // will not come; go back to listening instead of stranding the
            // session in Stopping, and let the caller retry
            self.stop_requested.store(false, Ordering::SeqCst);
            let mut state = self.state.lock().await;
            if *state == SessionState::Stopping {
                *state = SessionState::Listening;
            }
            return Err(e).context("Failed to request recognizer stop");
        }

        Ok(())
    }

    /// Explicitly prompt the user for microphone access
    pub async fn request_permission(&self) -> PermissionState {
        let outcome = self.gate.lock().await.request().await;
        if outcome != PermissionState::Granted {
            self.emit(UiEvent::PermissionPromptNeeded);
        }
        outcome
    }

    /// Wait for the engine event loop to wind down after a stop or a fatal
    /// error
    pub async fn wait_until_idle(&self) {
        let handle = self.loop_handle.lock().await.take();
        if let Some(task) = handle {
            if let Err(e) = task.await {
                error!("Capture event loop panicked: {}", e);
            }
        }
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Whether a capture is active (listening or winding down)
    pub async fn is_listening(&self) -> bool {
        *self.state.lock().await != SessionState::Idle
    }

    /// Live display text: accumulated transcript plus the interim tail
    pub async fn preview(&self) -> String {
        self.buffer.lock().await.preview()
    }

    /// Finalized transcript only
    pub async fn accumulated_final(&self) -> String {
        self.buffer.lock().await.accumulated_final().to_string()
    }

    /// Last observed microphone permission
    pub async fn permission_state(&self) -> PermissionState {
        self.gate.lock().await.state()
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let started_at = *self.started_at.lock().await;
        let duration = Utc::now().signed_duration_since(started_at);

        SessionStats {
            is_listening: self.is_listening().await,
            started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            restarts: self.restarts.load(Ordering::SeqCst),
            finalized_segments: self.buffer.lock().await.finalized_segments(),
        }
    }

    /// Hand an event to the UI without ever blocking the capture path
    fn emit(&self, event: UiEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("UI consumer lagging; dropping event: {:?}", event);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Consumes engine events for one capture, across transparent restarts
struct EventLoop {
    recognizer: RecognizerConfig,
    backend: Arc<Mutex<Box<dyn SpeechBackend>>>,
    state: Arc<Mutex<SessionState>>,
    stop_requested: Arc<AtomicBool>,
    buffer: Arc<Mutex<TranscriptBuffer>>,
    gate: Arc<Mutex<PermissionGate>>,
    dispatcher: Arc<SearchDispatcher>,
    events_tx: mpsc::Sender<UiEvent>,
    restarts: Arc<AtomicUsize>,
}

impl EventLoop {
    async fn run(self, mut rx: mpsc::Receiver<RecognitionEvent>) {
        debug!("Engine event loop started");

        loop {
            // A closed channel means the engine went away without sending
            // its end signal; treat it the same way
            let event = rx.recv().await.unwrap_or(RecognitionEvent::Ended);

            match event {
                RecognitionEvent::Partial { index, text } => {
                    self.apply_result(index, &text, false).await;
                }

                RecognitionEvent::Final { index, text } => {
                    self.apply_result(index, &text, true).await;
                }

                RecognitionEvent::Error(kind) => match classify_error(&kind) {
                    ErrorAction::Ignore => {
                        debug!("No speech detected; still listening");
                    }
                    ErrorAction::LogOnly => {
                        warn!("Transient recognition error: {:?}", kind);
                    }
                    ErrorAction::RepromptPermission => {
                        warn!("Microphone permission revoked while listening");
                        self.gate.lock().await.mark_denied();
                        self.backend.lock().await.stop().await.ok();
                        self.emit(UiEvent::PermissionPromptNeeded);
                        self.finish(false).await;
                        break;
                    }
                    ErrorAction::Fatal(err) => {
                        error!("Fatal recognition error: {}", err);
                        self.backend.lock().await.stop().await.ok();
                        self.emit(UiEvent::FatalError {
                            message: err.to_string(),
                        });
                        self.finish(false).await;
                        break;
                    }
                },

                RecognitionEvent::Ended => {
                    let state = *self.state.lock().await;
                    let stop_requested = self.stop_requested.load(Ordering::SeqCst);

                    match end_action(state, stop_requested) {
                        EndAction::Restart => {
                            // Engine-forced timeout: restart with the
                            // transcript intact so the user never notices
                            let mut backend = self.backend.lock().await;

                            // A stop may have won the backend lock in the
                            // gap since the decision above; its end signal
                            // went into the channel being replaced, so
                            // honor the stop instead of restarting
                            if self.stop_requested.load(Ordering::SeqCst) {
                                drop(backend);
                                info!("Recognition ended after stop request");
                                self.finish(true).await;
                                break;
                            }

                            match backend.start(&self.recognizer).await {
                                Ok(new_rx) => {
                                    drop(backend);
                                    // A stop that arrived while the restart
                                    // was in flight still wins; swapping in
                                    // the fresh channel would swallow its
                                    // end signal
                                    if self.stop_requested.load(Ordering::SeqCst) {
                                        info!("Recognition ended after stop request");
                                        self.finish(true).await;
                                        break;
                                    }
                                    rx = new_rx;
                                    let n = self.restarts.fetch_add(1, Ordering::SeqCst) + 1;
                                    info!("Engine-forced end absorbed; restart {} of this capture", n);
                                }
                                Err(e) => {
                                    drop(backend);
                                    let err = CaptureError::RestartFailure(e.to_string());
                                    error!("{}", err);
                                    self.emit(UiEvent::FatalError {
                                        message: err.to_string(),
                                    });
                                    self.finish(false).await;
                                    break;
                                }
                            }
                        }
                        EndAction::Finish => {
                            info!("Recognition ended after stop request");
                            self.finish(true).await;
                            break;
                        }
                    }
                }
            }
        }

        debug!("Engine event loop stopped");
    }

    /// Fold a result entry into the transcript and publish the new preview
    async fn apply_result(&self, index: usize, text: &str, is_final: bool) {
        let (changed, preview) = {
            let mut buffer = self.buffer.lock().await;
            let changed = buffer.apply(index, text, is_final);
            (changed, buffer.preview())
        };

        if changed {
            self.emit(UiEvent::PreviewChanged { text: preview });
        }
    }

    /// Return to Idle, optionally dispatching the finalized query
    async fn finish(&self, dispatch: bool) {
        *self.state.lock().await = SessionState::Idle;

        if dispatch {
            let preview = self.buffer.lock().await.preview();
            if self.dispatcher.dispatch(&preview).is_some() {
                // Cosmetic: clear the displayed query shortly after dispatch
                let tx = self.events_tx.clone();
                let delay = self.dispatcher.clear_delay();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    tx.try_send(UiEvent::PreviewChanged {
                        text: String::new(),
                    })
                    .ok();
                });
            }
        }

        self.emit(UiEvent::ListeningStateChanged { listening: false });
    }

    /// Hand an event to the UI without ever blocking the capture path
    fn emit(&self, event: UiEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("UI consumer lagging; dropping event: {:?}", event);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
