#![cfg(feature = "provider-gemini")]

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tconfig::SecretString;
use tprovider::adapters::gemini::{
    Candidate, Content, FunctionCall, GeminiChunkStream, GeminiProvider, GeminiTransport,
    GenerateContentRequest, GenerateContentResponse, Part, UsageMetadata,
};
use tprovider::{
    Message, ModelProvider, ModelRequest, ProviderError, ProviderErrorKind, ProviderFuture,
    StopReason, StreamEvent,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_key: Mutex<Option<String>>,
    captured_model: Mutex<Option<String>>,
    captured_request: Mutex<Option<GenerateContentRequest>>,
    fail_with: Option<ProviderError>,
}

impl FakeTransport {
    fn capture(&self, model: &str, request: GenerateContentRequest, api_key: &SecretString) {
        *self.captured_key.lock().expect("key lock") = Some(api_key.expose().to_string());
        *self.captured_model.lock().expect("model lock") = Some(model.to_string());
        *self.captured_request.lock().expect("request lock") = Some(request);
    }
}

fn text_chunk(text: &str, finish_reason: Option<&str>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".to_string()),
                parts: vec![Part::text(text)],
            }),
            finish_reason: finish_reason.map(str::to_string),
        }],
        usage_metadata: None,
        model_version: None,
    }
}

impl GeminiTransport for FakeTransport {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GenerateContentResponse, ProviderError>> {
        Box::pin(async move {
            self.capture(model, request, api_key);
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            let mut response = text_chunk("Ngày xửa ngày xưa", Some("STOP"));
            if let Some(content) = response.candidates[0].content.as_mut() {
                content.parts.push(Part::function_call(FunctionCall {
                    id: None,
                    name: "analyzeStory".to_string(),
                    args: serde_json::json!({"story": "..."}),
                }));
            }
            response.usage_metadata = Some(UsageMetadata {
                prompt_token_count: 4,
                candidates_token_count: 6,
                total_token_count: 10,
            });
            Ok(response)
        })
    }

    fn stream<'a>(
        &'a self,
        model: &'a str,
        request: GenerateContentRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.capture(model, request, api_key);
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            let output = futures_util::stream::iter(
                vec![
                    text_chunk("Ngày xửa ", None),
                    text_chunk("ngày xưa", Some("STOP")),
                ]
                .into_iter()
                .map(Ok),
            );

            Ok(Box::pin(output) as GeminiChunkStream<'a>)
        })
    }
}

fn request() -> ModelRequest {
    let mut request = ModelRequest::new("gemini-2.0-flash", vec![Message::user("Kể chuyện")]);
    request.system_prompt = Some("Bạn là TomiChat".to_string());
    request
}

#[tokio::test]
async fn complete_sends_api_key_and_maps_tool_use() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GeminiProvider::new(SecretString::new("test-key"), transport.clone());

    let response = provider
        .complete(request())
        .await
        .expect("complete should succeed");

    assert_eq!(response.text(), "Ngày xửa ngày xưa");
    assert_eq!(response.stop_reason, StopReason::ToolUse);
    assert_eq!(response.usage.total_tokens, 10);
    assert_eq!(response.tool_calls()[0].name, "analyzeStory");

    assert_eq!(
        transport.captured_key.lock().expect("key lock").as_deref(),
        Some("test-key")
    );
    assert_eq!(
        transport.captured_model.lock().expect("model lock").as_deref(),
        Some("gemini-2.0-flash")
    );
    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert!(captured.system_instruction.is_some());
}

#[tokio::test]
async fn stream_forwards_fragments_then_settled_response() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GeminiProvider::new(SecretString::new("test-key"), transport);

    let mut stream = provider
        .stream(request())
        .await
        .expect("stream should open");

    let mut deltas = Vec::new();
    let mut settled = None;
    while let Some(event) = stream.next().await {
        match event.expect("event should be ok") {
            StreamEvent::TextDelta(text) => deltas.push(text),
            StreamEvent::ResponseComplete(response) => settled = Some(response),
            StreamEvent::ToolCallDelta(_) => {}
        }
    }

    assert_eq!(deltas, vec!["Ngày xửa ".to_string(), "ngày xưa".to_string()]);
    let settled = settled.expect("stream should settle");
    assert_eq!(settled.text(), "Ngày xửa ngày xưa");
    assert_eq!(settled.stop_reason, StopReason::EndTurn);
}

#[tokio::test]
async fn blank_key_is_rejected_before_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GeminiProvider::new(SecretString::new("  "), transport.clone());

    let err = provider
        .complete(request())
        .await
        .expect_err("blank key should fail");

    assert_eq!(err.kind, ProviderErrorKind::Authentication);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn transport_errors_surface_from_stream() {
    let transport = Arc::new(FakeTransport {
        fail_with: Some(ProviderError::unavailable("backend overloaded")),
        ..FakeTransport::default()
    });
    let provider = GeminiProvider::new(SecretString::new("test-key"), transport);

    let mut stream = provider
        .stream(request())
        .await
        .expect("stream should open lazily");
    let first = stream.next().await.expect("stream should yield the error");

    assert_eq!(
        first.expect_err("first item should be an error").kind,
        ProviderErrorKind::Unavailable
    );
}
