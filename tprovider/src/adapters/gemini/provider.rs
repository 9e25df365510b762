//! Gemini provider implementation over a transport.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use tconfig::SecretString;

use crate::{
    BoxedEventStream, ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture,
    ProviderId, StreamEvent,
};

use super::convert::{ResponseAccumulator, to_generate_request, to_model_response};
use super::transport::GeminiTransport;

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: SecretString,
    transport: Arc<dyn GeminiTransport>,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, transport: Arc<dyn GeminiTransport>) -> Self {
        Self { api_key, transport }
    }

    fn ensure_credentials(&self) -> Result<(), ProviderError> {
        if self.api_key.expose().trim().is_empty() {
            return Err(ProviderError::authentication(
                "Gemini API key must not be empty",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &self.api_key)
            .field("transport", &self.transport)
            .finish()
    }
}

impl ModelProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            self.ensure_credentials()?;

            let model = request.model.clone();
            let body = to_generate_request(request);
            let response = self.transport.generate(&model, body, &self.api_key).await?;
            Ok(to_model_response(model, response))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            self.ensure_credentials()?;

            let model = request.model.clone();
            let body = to_generate_request(request);

            let stream = try_stream! {
                let mut chunks = self.transport.stream(&model, body, &self.api_key).await?;
                let mut accumulator = ResponseAccumulator::default();

                while let Some(chunk) = chunks.next().await {
                    for event in accumulator.push(chunk?) {
                        yield event;
                    }
                }

                yield StreamEvent::ResponseComplete(accumulator.finish(model.clone()));
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
