use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::search::SearchConfig;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// BCP-47 locale tag the recognizer listens in
    pub locale: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    /// Prefix the percent-encoded query is appended to
    pub url_base: String,

    /// How long a dispatched query stays on screen (cosmetic)
    pub clear_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "voice-query".to_string(),
            },
            capture: CaptureConfig {
                locale: "en-US".to_string(),
            },
            search: SearchSettings {
                url_base: "https://www.google.com/search?q=".to_string(),
                clear_delay_ms: 3000,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::with_locale(&self.capture.locale)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            url_base: self.search.url_base.clone(),
            clear_delay: Duration::from_millis(self.search.clear_delay_ms),
        }
    }
}
