// Integration tests for search dispatch
//
// These tests verify that a finalized query is encoded into a search URL
// and handed to the tab opener fire-and-forget.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};

use voice_query::{SearchConfig, SearchDispatcher, TabOpener};

struct RecordingOpener {
    urls: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl TabOpener for RecordingOpener {
    async fn open(&self, url: &str) -> Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct FailingOpener;

#[async_trait::async_trait]
impl TabOpener for FailingOpener {
    async fn open(&self, _url: &str) -> Result<()> {
        bail!("tab opening is unavailable")
    }
}

fn dispatcher(opener: Arc<dyn TabOpener>) -> SearchDispatcher {
    SearchDispatcher::new(
        opener,
        SearchConfig {
            url_base: "https://search.example/?q=".to_string(),
            clear_delay: Duration::from_millis(10),
        },
    )
}

async fn settle() {
    // Give the fire-and-forget open task a moment to run
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn test_dispatch_opens_one_encoded_tab() -> Result<()> {
    let urls = Arc::new(Mutex::new(Vec::new()));
    let d = dispatcher(Arc::new(RecordingOpener {
        urls: Arc::clone(&urls),
    }));

    let dispatched = d.dispatch("weather today");
    assert_eq!(
        dispatched.as_deref(),
        Some("https://search.example/?q=weather%20today")
    );

    settle().await;
    let urls = urls.lock().unwrap();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0], "https://search.example/?q=weather%20today");
    Ok(())
}

#[tokio::test]
async fn test_empty_query_dispatches_nothing() -> Result<()> {
    let urls = Arc::new(Mutex::new(Vec::new()));
    let d = dispatcher(Arc::new(RecordingOpener {
        urls: Arc::clone(&urls),
    }));

    assert!(d.dispatch("").is_none());
    assert!(d.dispatch("   \t ").is_none());

    settle().await;
    assert!(urls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_opener_failure_is_swallowed() -> Result<()> {
    // Fire-and-forget: a failing opener is logged, never surfaced
    let d = dispatcher(Arc::new(FailingOpener));

    let dispatched = d.dispatch("still fine");
    assert!(dispatched.is_some());

    settle().await;
    Ok(())
}
