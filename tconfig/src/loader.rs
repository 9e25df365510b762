//! Settings resolution: explicit overrides, then environment, then defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::{API_KEY_ENV_VARS, ChatSettings, ConfigError, SecretString, StreamingStrategy};

/// Host-facing settings document. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub enable_streaming: Option<bool>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub streaming_strategy: Option<StreamingStrategy>,
    pub session_root: Option<PathBuf>,
}

impl SettingsOverrides {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw)
            .map_err(|err| ConfigError::parse(format!("invalid settings document: {err}")))
    }

    /// Reads a settings file; a missing file yields empty overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::io(format!(
                    "failed to read settings file '{}': {err}",
                    path.display()
                )));
            }
        };

        Self::from_json_str(&raw)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_enable_streaming(mut self, enable_streaming: bool) -> Self {
        self.enable_streaming = Some(enable_streaming);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_streaming_strategy(mut self, strategy: StreamingStrategy) -> Self {
        self.streaming_strategy = Some(strategy);
        self
    }
}

pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct SettingsLoader {
    overrides: SettingsOverrides,
    env: EnvLookup,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            overrides: SettingsOverrides::default(),
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    pub fn load(&self) -> Result<ChatSettings, ConfigError> {
        let defaults = ChatSettings::default();
        let overrides = &self.overrides;

        let settings = ChatSettings {
            api_key: self.resolve_api_key(),
            model: overrides.model.clone().unwrap_or(defaults.model),
            enable_streaming: overrides
                .enable_streaming
                .unwrap_or(defaults.enable_streaming),
            max_tokens: overrides.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: overrides.temperature.unwrap_or(defaults.temperature),
            streaming_strategy: overrides
                .streaming_strategy
                .unwrap_or(defaults.streaming_strategy),
            session_root: overrides.session_root.clone(),
        };

        settings.validate()?;
        tracing::debug!(
            model = %settings.model,
            streaming = settings.enable_streaming,
            configured = settings.is_configured(),
            "chat settings resolved"
        );

        Ok(settings)
    }

    fn resolve_api_key(&self) -> Option<SecretString> {
        if let Some(secret) = self
            .overrides
            .api_key
            .as_deref()
            .and_then(SecretString::from_raw)
        {
            return Some(secret);
        }

        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| (self.env)(name))
            .find_map(|value| SecretString::from_raw(&value))
    }
}
