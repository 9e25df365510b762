//! Host-facing command and event surface.
//!
//! The panel receives [`HostCommand`]s and answers with [`HostEvent`]s in the
//! `{"command": ..., "data": ...}` envelope the webview understands.

use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tcommon::SessionId;
use tokio::sync::mpsc;

use crate::{
    ChatCoordinator, ChatError, ChatMessage, ChatTurnRequest, StoryRequest, StoryResponse,
    StreamingChunk, TurnEvent,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "camelCase")]
pub enum HostCommand {
    SendMessage { text: String },
    ClearChat,
    GenerateStory(StoryRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "camelCase")]
pub enum HostEvent {
    AddMessage {
        message: ChatMessage,
    },
    StreamingMessage {
        #[serde(rename = "messageId")]
        message_id: String,
        chunk: StreamingChunk,
    },
    ClearChat,
    StoryGenerated(StoryResponse),
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

/// Shown when a turn is refused for a reason other than the message itself.
pub const TURN_REJECTED_MESSAGE: &str = "Vui lòng đợi câu trả lời hiện tại hoàn tất";

impl HostEvent {
    pub fn error(error: &ChatError) -> Self {
        Self::Error {
            message: error.message.clone(),
            details: error.details(),
        }
    }
}

/// Destination for panel events. Returns `false` once the consumer is gone.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: HostEvent) -> bool;
}

#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: HostEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// One chat panel bound to a session.
pub struct ChatPanel {
    coordinator: Arc<ChatCoordinator>,
    session_id: SessionId,
    sink: Arc<dyn EventSink>,
}

impl ChatPanel {
    pub fn new(
        coordinator: Arc<ChatCoordinator>,
        session_id: impl Into<SessionId>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            coordinator,
            session_id: session_id.into(),
            sink,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Decodes a raw webview message and dispatches it.
    pub async fn handle_json(&self, raw: &str) {
        match serde_json::from_str::<HostCommand>(raw) {
            Ok(command) => self.handle(command).await,
            Err(err) => {
                tracing::warn!(error = %err, "unrecognized panel command");
                self.sink.emit(HostEvent::Error {
                    message: "Lệnh không hợp lệ".to_string(),
                    details: Some(err.to_string()),
                });
            }
        }
    }

    pub async fn handle(&self, command: HostCommand) {
        match command {
            HostCommand::SendMessage { text } => self.send_message(text).await,
            HostCommand::ClearChat => match self.coordinator.clear_chat(&self.session_id).await {
                Ok(()) => {
                    self.sink.emit(HostEvent::ClearChat);
                }
                Err(error) => {
                    self.sink.emit(HostEvent::error(&error));
                }
            },
            HostCommand::GenerateStory(request) => {
                let event = match self.coordinator.generate_story(request).await {
                    Ok(story) => HostEvent::StoryGenerated(story),
                    Err(error) => HostEvent::error(&error),
                };
                self.sink.emit(event);
            }
        }
    }

    async fn send_message(&self, text: String) {
        let request = ChatTurnRequest::new(self.session_id.clone(), text);
        let mut events = match self.coordinator.stream_turn(request) {
            Ok(events) => events,
            Err(error) if error.is_validation() => {
                self.sink.emit(HostEvent::error(&error));
                return;
            }
            Err(error) => {
                tracing::info!(session_id = %self.session_id, error = %error, "turn rejected");
                self.sink.emit(HostEvent::Error {
                    message: TURN_REJECTED_MESSAGE.to_string(),
                    details: Some(error.message),
                });
                return;
            }
        };

        while let Some(event) = events.next().await {
            let host_event = match event {
                Ok(TurnEvent::UserMessage(message) | TurnEvent::BotMessageStarted(message)) => {
                    HostEvent::AddMessage { message }
                }
                Ok(TurnEvent::Chunk { message_id, chunk }) => {
                    HostEvent::StreamingMessage { message_id, chunk }
                }
                Ok(TurnEvent::Finished(result)) if !result.streamed => HostEvent::AddMessage {
                    message: result.bot_message,
                },
                Ok(TurnEvent::Finished(_)) => continue,
                Err(error) => HostEvent::error(&error),
            };

            if !self.sink.emit(host_event) {
                tracing::info!(session_id = %self.session_id, "panel closed mid-turn");
                return;
            }
        }
    }
}
