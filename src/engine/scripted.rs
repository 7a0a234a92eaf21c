use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use super::backend::{RecognitionEvent, RecognizerConfig, SpeechBackend};

/// Speech backend that replays a pre-scripted sequence of engine events.
///
/// The script is a list of "legs", one per recognition session: each call to
/// `start` plays the next leg into the returned channel. A leg ending in
/// `Ended` simulates an engine-forced timeout, so a multi-leg script
/// exercises the transparent auto-restart path without a real engine.
pub struct ScriptedBackend {
    legs: VecDeque<Vec<RecognitionEvent>>,
    active_tx: Option<mpsc::Sender<RecognitionEvent>>,
    starts: Arc<AtomicUsize>,
    fail_when_exhausted: bool,
}

impl ScriptedBackend {
    pub fn new(legs: Vec<Vec<RecognitionEvent>>) -> Self {
        Self {
            legs: legs.into(),
            active_tx: None,
            starts: Arc::new(AtomicUsize::new(0)),
            fail_when_exhausted: false,
        }
    }

    /// Parse a script from JSON (the demo binary's replay format)
    pub fn from_json(json: &str) -> Result<Self> {
        let legs: Vec<Vec<RecognitionEvent>> =
            serde_json::from_str(json).context("Failed to parse recognition script")?;
        Ok(Self::new(legs))
    }

    /// Make `start` fail once the script runs out of legs, instead of
    /// opening a silent session. Simulates a restart that throws.
    pub fn fail_when_exhausted(mut self) -> Self {
        self.fail_when_exhausted = true;
        self
    }

    /// Shared counter of how many recognition sessions were started
    pub fn start_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.starts)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn start(&mut self, config: &RecognizerConfig) -> Result<mpsc::Receiver<RecognitionEvent>> {
        let leg = match self.legs.pop_front() {
            Some(leg) => leg,
            None if self.fail_when_exhausted => {
                bail!("scripted engine has no sessions left")
            }
            // Out of scripted legs: stay open and silent until stopped
            None => Vec::new(),
        };

        let seq = self.starts.fetch_add(1, Ordering::SeqCst);
        info!(
            "Scripted recognition session {} starting (locale={}, {} events)",
            seq,
            config.locale,
            leg.len()
        );

        let (tx, rx) = mpsc::channel(100);
        self.active_tx = Some(tx.clone());

        tokio::spawn(async move {
            for event in leg {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            // Keep the channel open; the backend holds the other sender so a
            // later stop() can still deliver Ended.
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.active_tx.take() {
            // The engine confirms quiescence with its end signal
            tx.send(RecognitionEvent::Ended).await.ok();
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active_tx
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
