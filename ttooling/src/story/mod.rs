//! Story tools: structured generators with fixed schemas and neutral fallbacks.
//!
//! Each tool is a [`StoryToolSpec`] (schemas, prompt, fallback) wrapped in the
//! generic [`StoryTool`], which does argument decoding, the structured model
//! call and error mapping.

mod character;
mod critique;
mod plot_twist;
mod setting;

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tprovider::{ModelClient, ToolDefinition};

use crate::{Tool, ToolError, ToolExecutionContext, ToolFuture, ToolKind, parse_arguments};

pub use character::{CharacterProfile, CharacterRequest, CreateCharacter};
pub use critique::{AnalyzeStory, StoryCritique, StoryCritiqueRequest};
pub use plot_twist::{CreatePlotTwist, PlotTwist, PlotTwistRequest};
pub use setting::{CreateSetting, SettingProfile, SettingRequest};

pub const DEFAULT_GENRE: &str = "phiêu lưu";

pub(crate) fn genre_or_default(genre: &Option<String>) -> &str {
    genre
        .as_deref()
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .unwrap_or(DEFAULT_GENRE)
}

pub trait StoryToolSpec: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    const KIND: ToolKind;
    const DESCRIPTION: &'static str;
    /// Message reported when the model client fails.
    const FAILURE_MESSAGE: &'static str;

    fn input_schema() -> Value;

    fn output_schema() -> Value;

    fn prompt(input: &Self::Input) -> String;

    fn fallback(input: &Self::Input) -> Self::Output;

    fn normalize(output: Self::Output) -> Self::Output {
        output
    }
}

pub struct StoryTool<S> {
    client: ModelClient,
    _marker: PhantomData<fn() -> S>,
}

impl<S: StoryToolSpec> StoryTool<S> {
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    /// Typed entry point; [`Tool::invoke`] decodes arguments and delegates here.
    pub async fn run(&self, input: S::Input) -> Result<S::Output, ToolError> {
        let prompt = S::prompt(&input);
        let fallback = S::fallback(&input);

        let output = self
            .client
            .generate_structured(&prompt, S::output_schema(), fallback)
            .await
            .map_err(|err| {
                tracing::warn!(tool = S::KIND.name(), error = %err, "story tool generation failed");
                ToolError::execution(format!("{}: {}", S::FAILURE_MESSAGE, err.message))
                    .with_tool_name(S::KIND.name())
            })?;

        Ok(S::normalize(output))
    }
}

impl<S: StoryToolSpec> Tool for StoryTool<S> {
    fn kind(&self) -> ToolKind {
        S::KIND
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: S::KIND.name().to_string(),
            description: S::DESCRIPTION.to_string(),
            input_schema: S::input_schema(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let input = parse_arguments::<S::Input>(args_json)?;
            let output = self.run(input).await?;
            serde_json::to_string(&output).map_err(|err| {
                ToolError::other(format!("failed to encode tool output: {err}"))
                    .with_tool_name(S::KIND.name())
            })
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider shared by the story tool tests.

    use std::sync::{Arc, Mutex};

    use tprovider::{
        BoxedEventStream, GenerationConfig, Message, ModelClient, ModelProvider, ModelRequest,
        ModelResponse, OutputItem, ProviderError, ProviderFuture, ProviderId, StopReason,
        TokenUsage, VecEventStream,
    };

    pub(crate) struct ScriptedProvider {
        reply: Result<String, ProviderError>,
        pub(crate) requests: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn last_prompt(&self) -> String {
            self.requests
                .lock()
                .expect("requests lock")
                .last()
                .and_then(|request| request.messages.last())
                .map(|message| message.content.clone())
                .unwrap_or_default()
        }
    }

    impl ModelProvider for ScriptedProvider {
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
                let text = self.reply.clone()?;
                Ok(ModelResponse {
                    provider: ProviderId::Gemini,
                    model,
                    output: vec![OutputItem::Message(Message::model(text))],
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                })
            })
        }

        fn stream<'a>(
            &'a self,
            _request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move { Ok(Box::pin(VecEventStream::new(Vec::new())) as BoxedEventStream<'a>) })
        }
    }

    pub(crate) fn client(provider: Arc<ScriptedProvider>) -> ModelClient {
        ModelClient::new(provider, GenerationConfig::new("gemini-2.0-flash"))
    }
}
