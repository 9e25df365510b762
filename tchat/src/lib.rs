//! Turn coordination for the TomiChat assistant.
//!
//! [`ChatCoordinator`] validates a user message, records it, asks the model
//! (with story tools available) and delivers the reply either as one message
//! or as cumulative [`StreamingChunk`]s. Without credentials it answers with
//! setup guidance; on model or tool failure it answers with an apology. Only
//! replies the model actually produced are added to history.
//!
//! ```rust
//! use tchat::{ChatTurnRequest, StreamingChunk, cumulative_windows};
//!
//! let windows = cumulative_windows("Ngày xửa ngày xưa", 5);
//! assert_eq!(windows.last().copied(), Some("Ngày xửa ngày xưa"));
//!
//! let chunk = StreamingChunk::partial(windows[0]);
//! assert!(!chunk.is_complete);
//! # let _ = ChatTurnRequest::new("session-1", "xin chào");
//! ```

mod chunker;
mod coordinator;
mod error;
mod flows;
mod hooks;
mod host;
pub mod prompts;
mod suggestions;
mod types;
mod validation;

pub mod prelude {
    pub use crate::{
        ChatCoordinator, ChatCoordinatorBuilder, ChatError, ChatErrorKind, ChatErrorSource,
        ChatMessage, ChatPanel, ChatPolicy, ChatTurnHooks, ChatTurnRequest, ChatTurnResult,
        ChatTurnStream, HostCommand, HostEvent, StoryLength, StoryRequest, StoryResponse,
        StreamingChunk, TurnEvent, TurnOutcome, TurnState,
    };
    pub use tcommon::SessionId;
}

pub use chunker::{CHUNK_DELAY, CHUNK_SIZE, cumulative_windows, simulate_chunks};
pub use coordinator::{
    ACTIVE_CONTEXT_MESSAGES, CONTEXT_WINDOW_MESSAGES, ChatCoordinator, ChatCoordinatorBuilder,
    ChatPolicy, DEFAULT_MAX_TOOL_ROUND_TRIPS,
};
pub use error::{ChatError, ChatErrorKind, ChatErrorSource};
pub use flows::{FlowBuilder, FlowSnapshot, ModelBackend};
pub use hooks::{ChatTurnHooks, NoopChatTurnHooks};
pub use host::{
    ChannelEventSink, ChatPanel, EventSink, HostCommand, HostEvent, TURN_REJECTED_MESSAGE,
};
pub use suggestions::{DEFAULT_SUGGESTIONS, MAX_SUGGESTIONS, suggestions_for};
pub use types::{
    ChatMessage, ChatTurnRequest, ChatTurnResult, ChatTurnStream, StoryLength, StoryRequest,
    StoryResponse, StreamingChunk, TurnEvent, TurnOutcome, TurnState,
};
pub use validation::{MAX_MESSAGE_LENGTH, validate_message};
