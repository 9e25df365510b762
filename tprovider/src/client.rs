//! Model client bound to one generation config.
//!
//! The client is the only thing the chat coordinator and the story tools talk
//! to. It applies the bound [`GenerationConfig`] to every request, reports to
//! [`ProviderOperationHooks`], and decodes structured output with a
//! caller-supplied fallback.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tcommon::GenerationOptions;
use tconfig::ChatSettings;

use crate::{
    BoxedEventStream, Message, ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse,
    NoopOperationHooks, ProviderError, ProviderFuture, ProviderId, ProviderOperationHooks,
    StreamEvent,
};

pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub system_prompt: Option<String>,
}

impl GenerationConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_output_tokens: tconfig::DEFAULT_MAX_TOKENS,
            temperature: tconfig::DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            system_prompt: None,
        }
    }

    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self::new(settings.model.clone())
            .with_max_output_tokens(settings.max_tokens)
            .with_temperature(settings.temperature)
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn options(&self) -> GenerationOptions {
        GenerationOptions::default()
            .with_max_tokens(self.max_output_tokens)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_top_k(self.top_k)
    }
}

#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn ModelProvider>,
    config: GenerationConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn ModelProvider>, config: GenerationConfig) -> Self {
        Self {
            provider,
            config,
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Request builder preloaded with the bound model, system prompt and sampling options.
    pub fn request_builder(&self) -> ModelRequestBuilder {
        let builder = ModelRequest::builder(self.config.model.clone()).options(self.config.options());
        match &self.config.system_prompt {
            Some(prompt) => builder.system_prompt(prompt.clone()),
            None => builder,
        }
    }

    pub async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let provider = self.provider.id();
        let started = Instant::now();
        self.hooks
            .on_request_start(provider, "complete", &request.model);

        match self.provider.complete(request).await {
            Ok(response) => {
                self.hooks
                    .on_success(provider, "complete", started.elapsed());
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(%provider, kind = ?error.kind, error = %error.message, "model call failed");
                self.hooks
                    .on_failure(provider, "complete", started.elapsed(), &error);
                Err(error)
            }
        }
    }

    pub fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let provider = self.provider.id();
            let started = Instant::now();
            self.hooks.on_request_start(provider, "stream", &request.model);

            let mut upstream = self.provider.stream(request).await.inspect_err(|error| {
                tracing::warn!(%provider, kind = ?error.kind, error = %error.message, "model stream failed to open");
                self.hooks
                    .on_failure(provider, "stream", started.elapsed(), error);
            })?;

            let hooks = Arc::clone(&self.hooks);
            let stream = try_stream! {
                while let Some(event) = upstream.next().await {
                    let event = event.inspect_err(|error| {
                        hooks.on_failure(provider, "stream", started.elapsed(), error);
                    })?;

                    if matches!(event, StreamEvent::ResponseComplete(_)) {
                        hooks.on_success(provider, "stream", started.elapsed());
                    }

                    yield event;
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }

    /// Single-prompt text generation.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = self.request_builder().message(Message::user(prompt)).build()?;
        Ok(self.complete(request).await?.text())
    }

    /// Asks for JSON matching `schema`; unparseable output yields `fallback`.
    pub async fn generate_structured<T>(
        &self,
        prompt: &str,
        schema: Value,
        fallback: T,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Send,
    {
        let request = self
            .request_builder()
            .message(Message::user(prompt))
            .response_schema(schema)
            .build()?;

        self.complete_structured(request, fallback).await
    }

    pub async fn complete_structured<T>(
        &self,
        request: ModelRequest,
        fallback: T,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.complete(request).await?;
        match parse_structured_output(&response.text()) {
            Ok(value) => Ok(value),
            Err(reason) => {
                tracing::warn!(provider = %self.provider.id(), %reason, "structured output unusable, using fallback");
                self.hooks
                    .on_structured_fallback(self.provider.id(), &reason);
                Ok(fallback)
            }
        }
    }
}

/// Decodes model JSON output, tolerating a surrounding markdown code fence.
pub fn parse_structured_output<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("model returned no output".to_string());
    }

    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|err| format!("invalid structured output: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use futures_util::StreamExt;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::{OutputItem, StopReason, TokenUsage, VecEventStream};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        rating: u8,
    }

    struct FakeProvider {
        reply: String,
        requests: Mutex<Vec<ModelRequest>>,
    }

    impl FakeProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn response(&self, model: String) -> ModelResponse {
            ModelResponse {
                provider: ProviderId::Gemini,
                model,
                output: vec![OutputItem::Message(Message::model(self.reply.clone()))],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }
        }
    }

    impl ModelProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Gemini
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                let model = request.model.clone();
                self.requests.lock().expect("requests lock").push(request);
                Ok(self.response(model))
            })
        }

        fn stream<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move {
                let response = self.response(request.model.clone());
                let stream = VecEventStream::new(vec![
                    Ok(StreamEvent::TextDelta(self.reply.clone())),
                    Ok(StreamEvent::ResponseComplete(response)),
                ]);
                Ok(Box::pin(stream) as BoxedEventStream<'a>)
            })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_request_start(&self, provider: ProviderId, operation: &str, _model: &str) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{provider}:{operation}"));
        }

        fn on_success(&self, provider: ProviderId, operation: &str, _elapsed: Duration) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{provider}:{operation}"));
        }

        fn on_structured_fallback(&self, provider: ProviderId, _reason: &str) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("fallback:{provider}"));
        }
    }

    fn client(provider: Arc<FakeProvider>) -> ModelClient {
        ModelClient::new(
            provider,
            GenerationConfig::new("gemini-2.0-flash").with_system_prompt("Bạn là TomiChat"),
        )
    }

    #[tokio::test]
    async fn generate_applies_bound_config() {
        let provider = Arc::new(FakeProvider::replying("Xin chào!"));
        let text = client(provider.clone())
            .generate("xin chào")
            .await
            .expect("generate should succeed");
        assert_eq!(text, "Xin chào!");

        let requests = provider.requests.lock().expect("requests lock");
        let request = &requests[0];
        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.system_prompt.as_deref(), Some("Bạn là TomiChat"));
        assert_eq!(request.options.top_p, Some(0.9));
        assert_eq!(request.options.top_k, Some(40));
        assert_eq!(request.options.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn structured_generation_parses_fenced_json() {
        let provider = Arc::new(FakeProvider::replying("```json\n{\"rating\": 8}\n```"));
        let verdict = client(provider.clone())
            .generate_structured("rate", json!({"type": "object"}), Verdict { rating: 7 })
            .await
            .expect("structured call should succeed");

        assert_eq!(verdict, Verdict { rating: 8 });
        let requests = provider.requests.lock().expect("requests lock");
        assert!(requests[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn structured_generation_falls_back_on_garbage() {
        let provider = Arc::new(FakeProvider::replying("not json at all"));
        let hooks = Arc::new(RecordingHooks::default());
        let verdict = client(provider)
            .with_hooks(hooks.clone())
            .generate_structured("rate", json!({"type": "object"}), Verdict { rating: 7 })
            .await
            .expect("fallback should not be an error");

        assert_eq!(verdict, Verdict { rating: 7 });
        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"fallback:gemini".to_string()));
    }

    #[tokio::test]
    async fn stream_reports_success_on_completion() {
        let provider = Arc::new(FakeProvider::replying("Ngày xưa"));
        let hooks = Arc::new(RecordingHooks::default());
        let client = client(provider).with_hooks(hooks.clone());
        let request = client
            .request_builder()
            .message(Message::user("kể chuyện"))
            .streaming(true)
            .build()
            .expect("request should build");

        let mut stream = client.stream(request).await.expect("stream should open");
        let mut deltas = Vec::new();
        while let Some(event) = stream.next().await {
            if let StreamEvent::TextDelta(text) = event.expect("event should be ok") {
                deltas.push(text);
            }
        }

        assert_eq!(deltas, vec!["Ngày xưa".to_string()]);
        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec!["start:gemini:stream".to_string(), "success:gemini:stream".to_string()]
        );
    }

    #[test]
    fn parse_structured_output_rejects_empty_text() {
        let result = parse_structured_output::<Verdict>("   ");
        assert_eq!(result, Err("model returned no output".to_string()));
    }
}
