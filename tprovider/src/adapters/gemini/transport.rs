//! Gemini transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tconfig::SecretString;

use crate::{ProviderError, ProviderFuture};

use super::types::{GenerateContentRequest, GenerateContentResponse, extract_error_message};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub type GeminiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, ProviderError>> + Send + 'a>>;

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GenerateContentResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    async fn send(
        &self,
        url: String,
        request: &GenerateContentRequest,
        api_key: &SecretString,
    ) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Gemini request failed with status {status}"));

        error_for_status(status, message)
    }
}

pub(crate) fn error_for_status(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => ProviderError::unavailable(message),
        _ => ProviderError::transport(message),
    }
}

impl GeminiTransport for GeminiHttpTransport {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GenerateContentResponse, ProviderError>> {
        Box::pin(async move {
            let url = self.endpoint(model, "generateContent");
            let response = self.send(url, &request, api_key).await?;

            response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))
        })
    }

    fn stream<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));
            let response = self.send(url, &request, api_key).await?;

            let stream = try_stream! {
                let mut bytes = response.bytes_stream();
                let mut decoder = SseDecoder::default();

                while let Some(item) = bytes.next().await {
                    let chunk = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    for payload in decoder.push(&chunk)? {
                        yield parse_chunk(&payload)?;
                    }
                }

                if let Some(payload) = decoder.finish()? {
                    yield parse_chunk(&payload)?;
                }
            };

            Ok(Box::pin(stream) as GeminiChunkStream<'a>)
        })
    }
}

fn parse_chunk(payload: &str) -> Result<GenerateContentResponse, ProviderError> {
    serde_json::from_str(payload).map_err(|err| ProviderError::transport(err.to_string()))
}

/// Splits a server-sent-event byte stream into `data:` payloads.
///
/// Buffers raw bytes so multi-byte characters split across network chunks
/// decode intact.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.buffer.extend_from_slice(bytes);
        let mut payloads = Vec::new();

        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.drain(..=newline_index).collect::<Vec<_>>();
            if let Some(payload) = data_payload(&line)? {
                payloads.push(payload);
            }
        }

        Ok(payloads)
    }

    pub(crate) fn finish(&mut self) -> Result<Option<String>, ProviderError> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Result<Option<String>, ProviderError> {
    let line = std::str::from_utf8(line).map_err(|err| ProviderError::transport(err.to_string()))?;
    let line = line.trim();

    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(None);
    };

    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    Ok(Some(payload.to_string()))
}
