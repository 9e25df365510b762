//! Unified facade over the TomiChat workspace crates.
//!
//! Most hosts need only this crate: it re-exports the coordinator, settings,
//! session store, provider and observability types, and wires them together
//! in [`build_runtime_with`].
//!
//! ```rust
//! use tomichat::{ChatSettings, StreamingStrategy};
//!
//! let settings = ChatSettings::default().with_streaming_strategy(StreamingStrategy::Simulated);
//! assert!(!settings.is_configured());
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use tchat;
pub use tcommon;
pub use tconfig;
pub use tmemory;
pub use tobserve;
pub use tprovider;
pub use ttooling;

pub use tchat::{
    ChannelEventSink, ChatCoordinator, ChatCoordinatorBuilder, ChatError, ChatErrorKind,
    ChatErrorSource, ChatMessage, ChatPanel, ChatPolicy, ChatTurnHooks, ChatTurnRequest,
    ChatTurnResult, ChatTurnStream, EventSink, HostCommand, HostEvent, NoopChatTurnHooks,
    StoryLength, StoryRequest, StoryResponse, StreamingChunk, TurnEvent, TurnOutcome, TurnState,
};
pub use tcommon::{BoxFuture, MetadataMap, SessionId, TraceId};
pub use tconfig::{
    ChatSettings, ConfigError, ConfigErrorKind, SecretString, SettingsLoader, SettingsOverrides,
    StreamingStrategy,
};
pub use tmemory::{
    FileSessionStore, MemoryError, MemoryErrorKind, MemorySessionStore, SessionData,
    SessionManager, SessionStore, SessionStoreConfig, create_session_store, generate_session_id,
};
pub use tobserve::{
    MetricsObservabilityHooks, ObservabilityHooks, SafeChatTurnHooks, SafeProviderHooks,
    SafeToolHooks, TracingObservabilityHooks,
};
pub use tprovider::{
    BoxedEventStream, GenerationConfig, Message, ModelClient, ModelProvider, ModelRequest,
    ModelResponse, OutputItem, ProviderError, ProviderErrorKind, ProviderFactory, ProviderFuture,
    ProviderId, ProviderOperationHooks, Role, StopReason, StreamEvent, TokenUsage, ToolCall,
    VecEventStream,
};
pub use ttooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolKind, ToolRegistry, ToolRuntime,
    ToolRuntimeHooks,
};

#[cfg(feature = "provider-gemini")]
pub use runtime::{build_runtime, build_runtime_from_env};
pub use runtime::{RuntimeOptions, TomiChatRuntime, build_runtime_with};
pub use util::{model_message, parse_story_length, story, streaming_turn, turn, user_message};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn tc_msg_macro_creates_expected_message() {
        let message = crate::tc_msg!(user => "xin chào");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "xin chào");
    }

    #[test]
    fn tc_messages_macro_builds_message_vector() {
        let messages = crate::tc_messages![
            user => "Kể một câu chuyện",
            model => "Ngày xửa ngày xưa...",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Model);
    }
}
