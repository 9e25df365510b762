//! Mapping between provider-agnostic requests/responses and Gemini payloads.

use serde_json::{Value, json};

use crate::{
    Message, ModelRequest, ModelResponse, OutputItem, ProviderId, Role, StopReason, StreamEvent,
    TokenUsage, ToolCall, ToolResult, ToolRound,
};

use super::types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiGenerationConfig,
    GeminiTool, GenerateContentRequest, GenerateContentResponse, Part, UsageMetadata,
};

const JSON_MIME_TYPE: &str = "application/json";

pub(crate) fn to_generate_request(request: ModelRequest) -> GenerateContentRequest {
    let mut contents = request
        .messages
        .into_iter()
        .map(content_from_message)
        .collect::<Vec<_>>();

    for round in request.tool_rounds {
        push_tool_round(&mut contents, round);
    }

    let response_mime_type = request
        .response_schema
        .as_ref()
        .map(|_| JSON_MIME_TYPE.to_string());
    let options = request.options;

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![GeminiTool {
            function_declarations: request
                .tools
                .into_iter()
                .map(|tool| FunctionDeclaration {
                    name: tool.name,
                    description: tool.description,
                    parameters: tool.input_schema,
                })
                .collect(),
        }]
    };

    GenerateContentRequest {
        contents,
        system_instruction: request
            .system_prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .map(|prompt| Content::text(None, prompt)),
        generation_config: Some(GeminiGenerationConfig {
            max_output_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            response_mime_type,
            response_schema: request.response_schema,
        }),
        tools,
    }
}

fn content_from_message(message: Message) -> Content {
    Content::text(Some(message.role.as_str()), message.content)
}

fn push_tool_round(contents: &mut Vec<Content>, round: ToolRound) {
    let calls = round
        .calls
        .into_iter()
        .map(|call| {
            Part::function_call(FunctionCall {
                id: None,
                args: serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({})),
                name: call.name,
            })
        })
        .collect::<Vec<_>>();

    let results = round
        .results
        .into_iter()
        .map(|result| Part::function_response(function_response(result)))
        .collect::<Vec<_>>();

    if !calls.is_empty() {
        contents.push(Content {
            role: Some(Role::Model.as_str().to_string()),
            parts: calls,
        });
    }

    if !results.is_empty() {
        contents.push(Content {
            role: Some(Role::User.as_str().to_string()),
            parts: results,
        });
    }
}

/// Gemini requires the response payload to be a JSON object.
fn function_response(result: ToolResult) -> FunctionResponse {
    let response = match serde_json::from_str::<Value>(&result.output) {
        Ok(Value::Object(object)) => Value::Object(object),
        Ok(other) => json!({ "result": other }),
        Err(_) => json!({ "result": result.output }),
    };

    FunctionResponse {
        id: None,
        name: result.name,
        response,
    }
}

fn parse_finish_reason(value: Option<&str>) -> StopReason {
    match value {
        None | Some("STOP") => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            StopReason::Safety
        }
        Some(_) => StopReason::Other,
    }
}

fn usage(metadata: Option<UsageMetadata>) -> TokenUsage {
    metadata
        .map(|usage| TokenUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        })
        .unwrap_or_default()
}

/// Folds one or more response chunks into a settled response.
///
/// A blocking call is a single chunk; a stream feeds every SSE payload through
/// [`ResponseAccumulator::push`] and receives the deltas to forward.
#[derive(Debug, Default)]
pub(crate) struct ResponseAccumulator {
    text: String,
    tool_calls: Vec<ToolCall>,
    finish_reason: Option<String>,
    usage: Option<UsageMetadata>,
    model_version: Option<String>,
}

impl ResponseAccumulator {
    pub(crate) fn push(&mut self, chunk: GenerateContentResponse) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if chunk.usage_metadata.is_some() {
            self.usage = chunk.usage_metadata;
        }
        if chunk.model_version.is_some() {
            self.model_version = chunk.model_version;
        }

        let Some(candidate) = chunk.candidates.into_iter().next() else {
            return events;
        };

        if candidate.finish_reason.is_some() {
            self.finish_reason = candidate.finish_reason;
        }

        for part in candidate.content.map(|content| content.parts).unwrap_or_default() {
            if let Some(text) = part.text
                && !text.is_empty()
            {
                self.text.push_str(&text);
                events.push(StreamEvent::TextDelta(text));
            }

            if let Some(call) = part.function_call {
                let tool_call = ToolCall {
                    id: call
                        .id
                        .unwrap_or_else(|| format!("call_{}", self.tool_calls.len())),
                    name: call.name,
                    arguments: call.args.to_string(),
                };
                self.tool_calls.push(tool_call.clone());
                events.push(StreamEvent::ToolCallDelta(tool_call));
            }
        }

        events
    }

    pub(crate) fn finish(self, requested_model: String) -> ModelResponse {
        let stop_reason = if self.tool_calls.is_empty() {
            parse_finish_reason(self.finish_reason.as_deref())
        } else {
            StopReason::ToolUse
        };

        let mut output = Vec::with_capacity(self.tool_calls.len() + 1);
        if !self.text.is_empty() {
            output.push(OutputItem::Message(Message::model(self.text)));
        }
        output.extend(self.tool_calls.into_iter().map(OutputItem::ToolCall));

        ModelResponse {
            provider: ProviderId::Gemini,
            model: self.model_version.unwrap_or(requested_model),
            output,
            stop_reason,
            usage: usage(self.usage),
        }
    }
}

pub(crate) fn to_model_response(
    requested_model: String,
    response: GenerateContentResponse,
) -> ModelResponse {
    let mut accumulator = ResponseAccumulator::default();
    accumulator.push(response);
    accumulator.finish(requested_model)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tcommon::GenerationOptions;

    use super::*;
    use crate::ToolDefinition;
    use crate::adapters::gemini::types::Candidate;

    fn chunk(parts: Vec<Part>, finish_reason: Option<&str>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                finish_reason: finish_reason.map(str::to_string),
            }],
            usage_metadata: None,
            model_version: None,
        }
    }

    #[test]
    fn request_maps_roles_tools_and_schema() {
        let mut request = ModelRequest::new(
            "gemini-2.0-flash",
            vec![Message::user("chào"), Message::model("Xin chào!"), Message::user("kể chuyện")],
        );
        request.system_prompt = Some("Bạn là TomiChat".to_string());
        request.options = GenerationOptions::default().with_max_tokens(2000).with_top_k(40);
        request.tools = vec![ToolDefinition {
            name: "createCharacter".to_string(),
            description: "Tạo nhân vật".to_string(),
            input_schema: json!({"type": "object"}),
        }];
        request.response_schema = Some(json!({"type": "object"}));

        let mapped = to_generate_request(request);
        let roles = mapped
            .contents
            .iter()
            .map(|content| content.role.clone().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(mapped.tools[0].function_declarations[0].name, "createCharacter");

        let config = mapped.generation_config.expect("config should be set");
        assert_eq!(config.max_output_tokens, Some(2000));
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert!(mapped.system_instruction.is_some());
    }

    #[test]
    fn tool_rounds_become_call_and_response_contents() {
        let request = ModelRequest::new("m", vec![Message::user("tạo nhân vật")]).with_tool_round(
            ToolRound {
                calls: vec![ToolCall {
                    id: "call_0".to_string(),
                    name: "createCharacter".to_string(),
                    arguments: r#"{"name":"Lan","role":"hero"}"#.to_string(),
                }],
                results: vec![ToolResult {
                    tool_call_id: "call_0".to_string(),
                    name: "createCharacter".to_string(),
                    output: r#"["not","an","object"]"#.to_string(),
                }],
            },
        );

        let mapped = to_generate_request(request);
        assert_eq!(mapped.contents.len(), 3);
        assert_eq!(mapped.contents[1].role.as_deref(), Some("model"));
        assert_eq!(mapped.contents[2].role.as_deref(), Some("user"));

        let response = mapped.contents[2].parts[0]
            .function_response
            .as_ref()
            .expect("function response should be present");
        assert_eq!(response.response, json!({"result": ["not", "an", "object"]}));
    }

    #[test]
    fn accumulator_emits_deltas_and_settles_tool_use() {
        let mut accumulator = ResponseAccumulator::default();
        let first = accumulator.push(chunk(vec![Part::text("Để tôi ")], None));
        let second = accumulator.push(chunk(
            vec![
                Part::text("tạo nhân vật."),
                Part::function_call(FunctionCall {
                    id: None,
                    name: "createCharacter".to_string(),
                    args: json!({"name": "Lan"}),
                }),
            ],
            Some("STOP"),
        ));

        assert_eq!(first, vec![StreamEvent::TextDelta("Để tôi ".to_string())]);
        assert_eq!(second.len(), 2);

        let response = accumulator.finish("gemini-2.0-flash".to_string());
        assert_eq!(response.text(), "Để tôi tạo nhân vật.");
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.tool_calls()[0].id, "call_0");
        assert_eq!(response.model, "gemini-2.0-flash");
    }

    #[test]
    fn safety_finish_reason_maps_to_safety() {
        let response = to_model_response("m".to_string(), chunk(Vec::new(), Some("SAFETY")));
        assert_eq!(response.stop_reason, StopReason::Safety);
        assert!(response.output.is_empty());
    }
}
