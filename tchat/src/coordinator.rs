//! Turn orchestration: validation, history, model calls, tool rounds and chunk delivery.

use std::collections::HashSet;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_stream::{stream, try_stream};
use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::json;
use tcommon::{SessionId, TraceId};
use tconfig::{ChatSettings, StreamingStrategy};
use tmemory::SessionManager;
use tprovider::{
    Message, ModelRequest, ProviderError, ProviderFactory, ProviderOperationHooks, StreamEvent,
    ToolCall, ToolResult, ToolRound,
};
use ttooling::{ToolExecutionContext, ToolRuntimeHooks};

use crate::chunker::{CHUNK_DELAY, CHUNK_SIZE, simulate_chunks};
use crate::flows::{FlowBuilder, FlowSnapshot, ModelBackend};
use crate::prompts::{
    self, APOLOGY, APOLOGY_SUGGESTIONS, DEFAULT_STORY_GENRE, LONG_STORY_MAX_TOKENS,
    NOT_CONFIGURED_GUIDANCE, NOT_CONFIGURED_SUGGESTIONS, STORY_FAILURE_MESSAGE,
};
use crate::suggestions::suggestions_for;
use crate::validation::{MAX_MESSAGE_LENGTH, validate_message};
use crate::{
    ChatError, ChatErrorSource, ChatMessage, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
    ChatTurnStream, NoopChatTurnHooks, StoryLength, StoryRequest, StoryResponse, StreamingChunk,
    TurnEvent, TurnOutcome, TurnState,
};

pub const DEFAULT_MAX_TOOL_ROUND_TRIPS: usize = 4;
pub const ACTIVE_CONTEXT_MESSAGES: usize = 20;
pub const CONTEXT_WINDOW_MESSAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    pub max_message_length: usize,
    pub max_tool_round_trips: usize,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    /// Recent history considered for a turn.
    pub active_context_messages: usize,
    /// Messages actually sent to the model, taken from the end of the active context.
    pub context_window_messages: usize,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_message_length: MAX_MESSAGE_LENGTH,
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            chunk_size: CHUNK_SIZE,
            chunk_delay: CHUNK_DELAY,
            active_context_messages: ACTIVE_CONTEXT_MESSAGES,
            context_window_messages: CONTEXT_WINDOW_MESSAGES,
        }
    }
}

impl ChatPolicy {
    pub fn with_max_message_length(mut self, max_message_length: usize) -> Self {
        self.max_message_length = max_message_length;
        self
    }

    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = chunk_delay;
        self
    }

    pub fn with_context_window(mut self, active: usize, sent: usize) -> Self {
        self.active_context_messages = active;
        self.context_window_messages = sent.min(active);
        self
    }
}

pub struct ChatCoordinatorBuilder {
    flows: FlowBuilder,
    sessions: Option<Arc<SessionManager>>,
    settings: ChatSettings,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatTurnHooks>,
}

impl ChatCoordinatorBuilder {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            flows: FlowBuilder::new(factory),
            sessions: None,
            settings: ChatSettings::default(),
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopChatTurnHooks),
        }
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ChatTurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.flows = self.flows.with_provider_hooks(hooks);
        self
    }

    pub fn with_tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.flows = self.flows.with_tool_hooks(hooks);
        self
    }

    pub fn build(self) -> Result<ChatCoordinator, ChatError> {
        self.settings.validate()?;
        let snapshot = self.flows.build(self.settings);
        self.hooks.on_reload(snapshot.is_ready());

        Ok(ChatCoordinator {
            sessions: self.sessions.unwrap_or_default(),
            flows: self.flows,
            snapshot: RwLock::new(Arc::new(snapshot)),
            policy: self.policy,
            hooks: self.hooks,
            in_flight: Mutex::new(HashSet::new()),
            epoch: AtomicU64::new(0),
        })
    }
}

/// Drives chat turns for any number of sessions, one turn per session at a time.
pub struct ChatCoordinator {
    sessions: Arc<SessionManager>,
    flows: FlowBuilder,
    snapshot: RwLock<Arc<FlowSnapshot>>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatTurnHooks>,
    in_flight: Mutex<HashSet<SessionId>>,
    epoch: AtomicU64,
}

impl ChatCoordinator {
    pub fn builder(factory: Arc<dyn ProviderFactory>) -> ChatCoordinatorBuilder {
        ChatCoordinatorBuilder::new(factory)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn settings(&self) -> ChatSettings {
        self.snapshot().settings.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ready()
    }

    /// Rebuilds client, tools and runtime from `settings` and swaps them in together.
    ///
    /// Turns already running keep the snapshot they started with. Returns readiness.
    pub fn reload(&self, settings: ChatSettings) -> Result<bool, ChatError> {
        settings.validate()?;
        let snapshot = Arc::new(self.flows.build(settings));
        let ready = snapshot.is_ready();

        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;

        tracing::info!(ready, "chat settings reloaded");
        self.hooks.on_reload(ready);
        Ok(ready)
    }

    /// Stops emission on every turn stream that is currently open.
    pub fn teardown(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(epoch, "chat coordinator teardown");
    }

    pub async fn history(&self, session_id: &SessionId) -> Vec<Message> {
        self.sessions.get_messages(session_id, None).await
    }

    /// Drops the session's stored history.
    pub async fn clear_chat(&self, session_id: &SessionId) -> Result<(), ChatError> {
        self.sessions
            .delete_session(session_id)
            .await
            .map_err(ChatError::from)?;
        tracing::info!(session_id = %session_id, "chat history cleared");
        Ok(())
    }

    /// Runs a turn without chunk delivery and returns the finished result.
    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let mut events = self.open_turn(request, false)?;

        while let Some(event) = events.next().await {
            if let TurnEvent::Finished(result) = event? {
                return Ok(result);
            }
        }

        Err(ChatError::model_unavailable("turn was torn down before it finished"))
    }

    /// Opens a turn whose events are pulled by the caller.
    ///
    /// Validation failures and a turn already running for the session are
    /// returned here; nothing is recorded for them. Dropping the stream
    /// cancels the turn and its reply is never added to history.
    pub fn stream_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnStream<'_>, ChatError> {
        let streaming = request
            .stream
            .unwrap_or_else(|| self.snapshot().settings.enable_streaming);
        self.open_turn(request, streaming)
    }

    pub async fn generate_story(&self, request: StoryRequest) -> Result<StoryResponse, ChatError> {
        let snapshot = self.snapshot();
        let Some(backend) = snapshot.backend() else {
            tracing::info!("story requested without credentials");
            return Ok(prompts::story_not_configured());
        };

        let genre = request
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
            .unwrap_or(DEFAULT_STORY_GENRE);
        let max_tokens = match request.length {
            StoryLength::Long => LONG_STORY_MAX_TOKENS,
            StoryLength::Short | StoryLength::Medium => snapshot.settings.max_tokens,
        };

        let story_error = |error: ProviderError| {
            tracing::warn!(error = %error, "story generation failed");
            ChatError::story_generation(STORY_FAILURE_MESSAGE)
                .with_source(ChatErrorSource::Provider(error))
        };

        let model_request = backend
            .plain
            .request_builder()
            .message(Message::user(prompts::story_prompt(
                &request.idea,
                genre,
                request.length,
            )))
            .max_tokens(max_tokens)
            .response_schema(prompts::story_schema())
            .build()
            .map_err(story_error)?;

        backend
            .plain
            .complete_structured(model_request, prompts::story_fallback())
            .await
            .map_err(story_error)
    }

    fn snapshot(&self) -> Arc<FlowSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn open_turn(
        &self,
        request: ChatTurnRequest,
        streaming: bool,
    ) -> Result<ChatTurnStream<'_>, ChatError> {
        let ChatTurnRequest {
            session_id, text, ..
        } = request;

        if let Err(error) = validate_message(&text, self.policy.max_message_length) {
            let error = error.with_phase(TurnState::Validating);
            self.hooks.on_turn_rejected(&session_id, &error);
            return Err(error);
        }

        let guard = self.begin_turn(&session_id)?;
        let epoch = self.epoch.load(Ordering::SeqCst);
        let turn = self.drive_turn(guard, self.snapshot(), session_id, text, streaming);

        Ok(Box::pin(stream! {
            let mut turn = pin!(turn);
            while let Some(item) = turn.next().await {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    tracing::info!("turn stream stopped by teardown");
                    break;
                }
                yield item;
            }
        }))
    }

    fn begin_turn(&self, session_id: &SessionId) -> Result<TurnGuard<'_>, ChatError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !in_flight.insert(session_id.clone()) {
            let error = ChatError::turn_in_progress(format!(
                "a reply for session '{session_id}' is still being generated"
            ))
            .with_phase(TurnState::Validating);
            self.hooks.on_turn_rejected(session_id, &error);
            return Err(error);
        }

        Ok(TurnGuard {
            in_flight: &self.in_flight,
            session_id: session_id.clone(),
        })
    }

    fn drive_turn<'a>(
        &'a self,
        guard: TurnGuard<'a>,
        snapshot: Arc<FlowSnapshot>,
        session_id: SessionId,
        text: String,
        streaming: bool,
    ) -> impl Stream<Item = Result<TurnEvent, ChatError>> + Send + 'a {
        try_stream! {
            let _guard = guard;
            let started = Instant::now();
            let mut state = StateTracker::new(self.hooks.as_ref(), session_id.clone());
            self.hooks.on_turn_start(&session_id, streaming);
            state.enter(TurnState::Validating);

            let user_message = ChatMessage::user(text.clone());
            let trace_id = TraceId::new(user_message.id.clone());
            self.sessions
                .add_message(&session_id, Message::user(text.clone()))
                .await
                .map_err(|error| ChatError::from(error).with_phase(TurnState::Validating))?;
            yield TurnEvent::UserMessage(user_message.clone());

            state.enter(TurnState::AwaitingModel);
            let mut bot_message = if streaming {
                ChatMessage::streaming_placeholder()
            } else {
                ChatMessage::bot(String::new())
            };
            if streaming {
                yield TurnEvent::BotMessageStarted(bot_message.clone());
            }

            let upstream = streaming
                && snapshot.settings.streaming_strategy == StreamingStrategy::Upstream;

            let reply = match snapshot.backend() {
                None => Reply::NotConfigured,
                Some(backend) => {
                    let context = self.context_window(&session_id, &text).await;
                    if upstream {
                        state.enter(TurnState::Streaming);
                        let mut reply_text = String::new();
                        let mut round_trips = 0;
                        let mut failure = None;
                        let mut pending = chat_request(backend, context, true);

                        loop {
                            let request = match pending {
                                Ok(request) => request,
                                Err(error) => {
                                    failure = Some(error);
                                    break;
                                }
                            };
                            let mut events = match backend.chat.stream(request.clone()).await {
                                Ok(events) => events,
                                Err(error) => {
                                    failure = Some(ChatError::from(error));
                                    break;
                                }
                            };

                            let mut settled = None;
                            while let Some(event) = events.next().await {
                                match event {
                                    Ok(StreamEvent::TextDelta(delta)) => {
                                        reply_text.push_str(&delta);
                                        let chunk = StreamingChunk::partial(reply_text.clone());
                                        bot_message.apply_chunk(&chunk);
                                        yield TurnEvent::Chunk {
                                            message_id: bot_message.id.clone(),
                                            chunk,
                                        };
                                    }
                                    Ok(StreamEvent::ToolCallDelta(_)) => {}
                                    Ok(StreamEvent::ResponseComplete(response)) => {
                                        settled = Some(response);
                                    }
                                    Err(error) => {
                                        failure = Some(ChatError::from(error));
                                        break;
                                    }
                                }
                            }
                            if failure.is_some() {
                                break;
                            }

                            let Some(response) = settled else {
                                failure = Some(ChatError::model_unavailable(
                                    "model stream ended without a settled response",
                                ));
                                break;
                            };
                            let calls = response.tool_calls();
                            if calls.is_empty() {
                                break;
                            }
                            pending = self
                                .run_tool_round(backend, &session_id, &trace_id, request, calls, &mut round_trips)
                                .await;
                        }

                        match failure {
                            Some(error) => Reply::Failed(error),
                            None => Reply::from_text(reply_text, true),
                        }
                    } else {
                        match self
                            .complete_with_tools(backend, &session_id, &trace_id, context)
                            .await
                        {
                            Ok(reply_text) => Reply::from_text(reply_text, false),
                            Err(error) => Reply::Failed(error),
                        }
                    }
                }
            };

            let (final_text, suggestions, outcome, already_streamed) = match reply {
                Reply::Model { text: reply_text, streamed } => {
                    (reply_text, suggestions_for(&text), TurnOutcome::Replied, streamed)
                }
                Reply::NotConfigured => {
                    state.enter(TurnState::Finalizing);
                    (
                        NOT_CONFIGURED_GUIDANCE.to_string(),
                        prompts::owned(&NOT_CONFIGURED_SUGGESTIONS),
                        TurnOutcome::NotConfigured,
                        false,
                    )
                }
                Reply::Failed(error) => {
                    let error = error.with_phase(state.current());
                    tracing::warn!(session_id = %session_id, error = %error, "turn failed; replying with apology");
                    state.enter(TurnState::Errored);
                    (
                        APOLOGY.to_string(),
                        prompts::owned(&APOLOGY_SUGGESTIONS),
                        TurnOutcome::Failed(error),
                        false,
                    )
                }
            };

            // The reply is stored before the complete chunk is yielded.
            let replied = outcome == TurnOutcome::Replied;
            if streaming {
                if already_streamed {
                    if replied {
                        state.enter(TurnState::Finalizing);
                        self.persist_reply(&session_id, &final_text).await?;
                    }
                    let chunk = StreamingChunk::complete(final_text.clone(), suggestions.clone());
                    bot_message.apply_chunk(&chunk);
                    yield TurnEvent::Chunk {
                        message_id: bot_message.id.clone(),
                        chunk,
                    };
                } else {
                    if replied {
                        state.enter(TurnState::Streaming);
                    }
                    let mut chunks = pin!(simulate_chunks(
                        final_text.clone(),
                        suggestions.clone(),
                        self.policy.chunk_size,
                        self.policy.chunk_delay,
                    ));
                    while let Some(chunk) = chunks.next().await {
                        if chunk.is_complete && replied {
                            state.enter(TurnState::Finalizing);
                            self.persist_reply(&session_id, &final_text).await?;
                        }
                        bot_message.apply_chunk(&chunk);
                        yield TurnEvent::Chunk {
                            message_id: bot_message.id.clone(),
                            chunk,
                        };
                    }
                }
            } else if replied {
                state.enter(TurnState::Finalizing);
                self.persist_reply(&session_id, &final_text).await?;
            }
            state.enter(TurnState::Idle);

            if !streaming {
                bot_message.text = final_text;
                bot_message.suggestions = Some(suggestions);
            }

            let elapsed = started.elapsed();
            tracing::info!(
                session_id = %session_id,
                outcome = outcome.as_str(),
                streamed = streaming,
                elapsed_ms = elapsed.as_millis() as u64,
                "turn finished"
            );
            self.hooks.on_turn_complete(&session_id, &outcome, elapsed);

            yield TurnEvent::Finished(ChatTurnResult {
                session_id: session_id.clone(),
                user_message,
                bot_message,
                outcome,
                streamed: streaming,
                elapsed,
            });
        }
    }

    async fn persist_reply(&self, session_id: &SessionId, text: &str) -> Result<(), ChatError> {
        self.sessions
            .add_message(session_id, Message::model(text))
            .await
            .map_err(|error| ChatError::from(error).with_phase(TurnState::Finalizing))
    }

    /// Last `context_window_messages` of the active history, ending with the user's message.
    async fn context_window(&self, session_id: &SessionId, user_text: &str) -> Vec<Message> {
        let mut active = self
            .sessions
            .get_messages(session_id, Some(self.policy.active_context_messages))
            .await;

        let user_message = Message::user(user_text);
        if active.last() != Some(&user_message) {
            active.push(user_message);
        }

        let skip = active
            .len()
            .saturating_sub(self.policy.context_window_messages.max(1));
        active.split_off(skip)
    }

    async fn complete_with_tools(
        &self,
        backend: &ModelBackend,
        session_id: &SessionId,
        trace_id: &TraceId,
        context: Vec<Message>,
    ) -> Result<String, ChatError> {
        let mut request = chat_request(backend, context, false)?;
        let mut reply_text = String::new();
        let mut round_trips = 0;

        loop {
            let response = backend.chat.complete(request.clone()).await?;
            reply_text.push_str(&response.text());

            let calls = response.tool_calls();
            if calls.is_empty() {
                return Ok(reply_text);
            }
            request = self
                .run_tool_round(backend, session_id, trace_id, request, calls, &mut round_trips)
                .await?;
        }
    }

    /// Executes one batch of tool calls and returns the request that carries their results.
    ///
    /// Unknown tools and malformed arguments are reported back to the model;
    /// a tool whose own generation fails ends the turn.
    async fn run_tool_round(
        &self,
        backend: &ModelBackend,
        session_id: &SessionId,
        trace_id: &TraceId,
        request: ModelRequest,
        calls: Vec<ToolCall>,
        round_trips: &mut usize,
    ) -> Result<ModelRequest, ChatError> {
        if *round_trips >= self.policy.max_tool_round_trips {
            return Err(ChatError::tool_execution(format!(
                "model kept calling tools after {} rounds",
                self.policy.max_tool_round_trips
            )));
        }
        *round_trips += 1;

        let context = ToolExecutionContext::new(session_id.clone()).with_trace_id(trace_id.clone());
        let mut results = Vec::with_capacity(calls.len());

        for call in &calls {
            match backend.runtime.execute(call.clone(), context.clone()).await {
                Ok(result) => results.push(result.into_tool_result()),
                Err(error) if error.is_call_error() => {
                    tracing::debug!(tool = %call.name, error = %error, "returning tool call error to the model");
                    results.push(ToolResult {
                        tool_call_id: call.id.clone(),
                        name: call.name.clone(),
                        output: json!({ "error": error.message }).to_string(),
                    });
                }
                Err(error) => return Err(ChatError::from(error)),
            }
        }

        Ok(request.with_tool_round(ToolRound { calls, results }))
    }
}

fn chat_request(
    backend: &ModelBackend,
    context: Vec<Message>,
    stream: bool,
) -> Result<ModelRequest, ChatError> {
    backend
        .chat
        .request_builder()
        .messages(context)
        .tools(backend.runtime.definitions())
        .streaming(stream)
        .build()
        .map_err(ChatError::from)
}

enum Reply {
    Model { text: String, streamed: bool },
    NotConfigured,
    Failed(ChatError),
}

impl Reply {
    fn from_text(text: String, streamed: bool) -> Self {
        if text.trim().is_empty() {
            return Self::Failed(ChatError::model_unavailable("model returned an empty reply"));
        }
        Self::Model { text, streamed }
    }
}

struct TurnGuard<'a> {
    in_flight: &'a Mutex<HashSet<SessionId>>,
    session_id: SessionId,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session_id);
    }
}

struct StateTracker<'a> {
    hooks: &'a dyn ChatTurnHooks,
    session_id: SessionId,
    state: TurnState,
}

impl<'a> StateTracker<'a> {
    fn new(hooks: &'a dyn ChatTurnHooks, session_id: SessionId) -> Self {
        Self {
            hooks,
            session_id,
            state: TurnState::Idle,
        }
    }

    fn current(&self) -> TurnState {
        self.state
    }

    fn enter(&mut self, next: TurnState) {
        if next == self.state {
            return;
        }
        tracing::debug!(session_id = %self.session_id, from = %self.state, to = %next, "turn state");
        self.hooks.on_state_change(&self.session_id, self.state, next);
        self.state = next;
    }
}
