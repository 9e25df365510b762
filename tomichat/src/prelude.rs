//! Common imports for most TomiChat hosts.

#[cfg(feature = "provider-gemini")]
pub use crate::{build_runtime, build_runtime_from_env};
pub use crate::{
    ChatCoordinator, ChatError, ChatErrorKind, ChatMessage, ChatPanel, ChatPolicy, ChatSettings,
    ChatTurnRequest, ChatTurnResult, HostCommand, HostEvent, Message, Role, RuntimeOptions,
    SessionId, SessionManager, StoryLength, StoryRequest, StoryResponse, StreamingChunk,
    TomiChatRuntime, TurnEvent, TurnOutcome, build_runtime_with, parse_story_length, story,
    streaming_turn, turn,
};
pub use crate::{tc_messages, tc_msg};
