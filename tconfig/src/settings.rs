//! Resolved chat settings and their defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, SecretString};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GOOGLE_GENAI_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// How model output reaches the panel while a turn is streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamingStrategy {
    /// Forward fragments as the backend produces them.
    #[default]
    Upstream,
    /// Generate the full reply, then replay it in fixed-size windows.
    Simulated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub enable_streaming: bool,
    pub max_tokens: u32,
    pub temperature: f32,
    pub streaming_strategy: StreamingStrategy,
    pub session_root: Option<PathBuf>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            enable_streaming: true,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            streaming_strategy: StreamingStrategy::default(),
            session_root: None,
        }
    }
}

impl ChatSettings {
    pub fn with_api_key(mut self, api_key: impl AsRef<str>) -> Self {
        self.api_key = SecretString::from_raw(api_key.as_ref());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_streaming(mut self, enable_streaming: bool) -> Self {
        self.enable_streaming = enable_streaming;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_streaming_strategy(mut self, strategy: StreamingStrategy) -> Self {
        self.streaming_strategy = strategy;
        self
    }

    pub fn with_session_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.session_root = Some(root.into());
        self
    }

    /// True when a non-blank API key was resolved.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose().trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model must not be empty"));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::invalid("maxTokens must be greater than zero"));
        }

        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::invalid(format!(
                "temperature must be between 0.0 and {MAX_TEMPERATURE}"
            )));
        }

        Ok(())
    }
}
