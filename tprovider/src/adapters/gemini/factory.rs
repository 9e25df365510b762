//! Settings-driven construction of the Gemini provider.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tconfig::ChatSettings;

use crate::{ModelProvider, ProviderError, ProviderFactory};

use super::provider::GeminiProvider;
use super::transport::{GEMINI_BASE_URL, GeminiHttpTransport};

#[derive(Debug, Clone)]
pub struct GeminiProviderFactory {
    pub timeout: Duration,
    pub base_url: String,
}

impl Default for GeminiProviderFactory {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(90),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

impl GeminiProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ProviderFactory for GeminiProviderFactory {
    fn build(&self, settings: &ChatSettings) -> Result<Arc<dyn ModelProvider>, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.expose().trim().is_empty())
            .ok_or_else(|| ProviderError::authentication("Gemini API key is not configured"))?;

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| ProviderError::transport(err.to_string()))?;
        let transport =
            Arc::new(GeminiHttpTransport::new(http).with_base_url(self.base_url.clone()));

        Ok(Arc::new(GeminiProvider::new(api_key, transport)))
    }
}
