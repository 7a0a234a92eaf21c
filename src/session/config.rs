use serde::{Deserialize, Serialize};

use crate::engine::RecognizerConfig;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier, used in logs
    pub session_id: String,

    /// Recognizer settings (locale, continuous, interim results)
    pub recognizer: RecognizerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("capture-{}", uuid::Uuid::new_v4()),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_locale(locale: impl Into<String>) -> Self {
        Self {
            recognizer: RecognizerConfig {
                locale: locale.into(),
                ..RecognizerConfig::default()
            },
            ..Self::default()
        }
    }
}
