use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use voice_query::{
    CaptureSession, CaptureStream, Config, MediaCapture, ProbeOutcome, RecognitionEvent,
    ScriptedBackend, SessionConfig, SpeechBackendFactory, SpeechSource, TabOpener, UiEvent,
};

/// Replay a scripted voice capture and dispatch the resulting search
#[derive(Debug, Parser)]
struct Args {
    /// Config file name (without extension)
    #[arg(long, default_value = "config/voice-query")]
    config: String,

    /// JSON file holding a recognition script (legs of engine events)
    #[arg(long)]
    script: Option<String>,

    /// Override the recognizer locale from the config file
    #[arg(long)]
    locale: Option<String>,
}

struct DemoCapture;
struct DemoStream;

impl CaptureStream for DemoStream {}

#[async_trait::async_trait]
impl MediaCapture for DemoCapture {
    async fn probe(&self) -> ProbeOutcome {
        ProbeOutcome::Granted(Box::new(DemoStream))
    }

    async fn request(&self) -> bool {
        true
    }
}

struct LoggingOpener;

#[async_trait::async_trait]
impl TabOpener for LoggingOpener {
    async fn open(&self, url: &str) -> Result<()> {
        info!("Would open search tab: {}", url);
        Ok(())
    }
}

/// Two scripted recognition sessions separated by an engine-forced end, so
/// the replay exercises the transparent restart path.
fn demo_script() -> Vec<Vec<RecognitionEvent>> {
    vec![
        vec![
            RecognitionEvent::Partial {
                index: 0,
                text: "weather".to_string(),
            },
            RecognitionEvent::Partial {
                index: 0,
                text: "weather today".to_string(),
            },
            RecognitionEvent::Ended,
        ],
        vec![RecognitionEvent::Final {
            index: 0,
            text: "weather today".to_string(),
        }],
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("No config file loaded ({}); using defaults", e);
            Config::default()
        }
    };

    info!("{} v0.1.0", cfg.service.name);

    let backend: Box<dyn voice_query::SpeechBackend> = match &args.script {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Box::new(ScriptedBackend::from_json(&json)?)
        }
        None => SpeechBackendFactory::create(SpeechSource::Scripted(demo_script()))?,
    };

    let mut session_config = cfg.session_config();
    if let Some(locale) = args.locale {
        session_config = SessionConfig::with_locale(locale);
    }
    info!("Recognizer locale: {}", session_config.recognizer.locale);

    let (session, mut events) = CaptureSession::new(
        session_config,
        backend,
        Arc::new(DemoCapture),
        Arc::new(LoggingOpener),
        cfg.search_config(),
    );

    let ui_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UiEvent::PreviewChanged { text } => {
                    print!("\r{}", text);
                    std::io::Write::flush(&mut std::io::stdout()).ok();
                }
                UiEvent::ListeningStateChanged { listening } => {
                    info!("Listening: {}", listening);
                }
                UiEvent::PermissionPromptNeeded => {
                    warn!("Microphone permission needed");
                }
                UiEvent::FatalError { message } => {
                    warn!("Capture failed: {}", message);
                }
            }
        }
    });

    session.start().await?;

    // Let the script play out, then stop the way a user would
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.stop().await?;
    session.wait_until_idle().await;

    let stats = session.stats().await;
    println!();
    info!(
        "Capture complete: {:.1}s, {} restart(s), {} finalized segment(s)",
        stats.duration_secs, stats.restarts, stats.finalized_segments
    );
    info!("Final transcript: {}", session.accumulated_final().await);

    drop(session);
    ui_task.await.ok();

    Ok(())
}
