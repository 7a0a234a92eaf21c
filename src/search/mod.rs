//! Outbound search dispatch
//!
//! Turns a finalized transcript into a search-tab request. Dispatch is
//! fire-and-forget: the tab opener's outcome is logged but never awaited by
//! the session and never surfaced to the user.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Characters left literal in the encoded query; everything else becomes
/// a %XX escape. Spaces encode as %20, not '+'.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Tab-opening capability trait
///
/// Opens a URL in a new browser tab; no return value is consumed.
#[async_trait::async_trait]
pub trait TabOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<()>;
}

/// Configuration for search dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Prefix the encoded query is appended to
    pub url_base: String,

    /// How long the dispatched query stays on screen before the preview is
    /// cleared (cosmetic only)
    pub clear_delay: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_base: "https://www.google.com/search?q=".to_string(),
            clear_delay: Duration::from_secs(3),
        }
    }
}

/// Dispatches a finalized query to a new search tab
pub struct SearchDispatcher {
    opener: Arc<dyn TabOpener>,
    config: SearchConfig,
}

impl SearchDispatcher {
    pub fn new(opener: Arc<dyn TabOpener>, config: SearchConfig) -> Self {
        Self { opener, config }
    }

    /// Build the search URL for a query; `None` when the trimmed query is
    /// empty and nothing should be dispatched.
    pub fn build_url(&self, query: &str) -> Option<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }

        let encoded = utf8_percent_encode(trimmed, QUERY_ENCODE_SET);
        Some(format!("{}{}", self.config.url_base, encoded))
    }

    /// Open a search tab for the query, fire-and-forget.
    ///
    /// Returns the dispatched URL, or `None` when the query was empty.
    pub fn dispatch(&self, query: &str) -> Option<String> {
        let url = self.build_url(query)?;

        info!("Dispatching search: {}", url);

        let opener = Arc::clone(&self.opener);
        let spawned_url = url.clone();
        tokio::spawn(async move {
            if let Err(e) = opener.open(&spawned_url).await {
                error!("Failed to open search tab: {}", e);
            }
        });

        Some(url)
    }

    /// Delay before the dispatched query is cleared from the display
    pub fn clear_delay(&self) -> Duration {
        self.config.clear_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopOpener;

    #[async_trait::async_trait]
    impl TabOpener for NoopOpener {
        async fn open(&self, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    fn dispatcher() -> SearchDispatcher {
        SearchDispatcher::new(Arc::new(NoopOpener), SearchConfig::default())
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let url = dispatcher().build_url("weather today").unwrap();
        assert_eq!(url, "https://www.google.com/search?q=weather%20today");
    }

    #[test]
    fn test_empty_and_whitespace_queries_build_nothing() {
        assert!(dispatcher().build_url("").is_none());
        assert!(dispatcher().build_url("   ").is_none());
    }

    #[test]
    fn test_query_is_trimmed_before_encoding() {
        let url = dispatcher().build_url("  lunch nearby ").unwrap();
        assert!(url.ends_with("lunch%20nearby"));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let url = dispatcher().build_url("a&b=c?").unwrap();
        assert!(url.ends_with("a%26b%3Dc%3F"));
    }
}
