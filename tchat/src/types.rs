//! Turn, message and story types exchanged with the host panel.

use std::fmt::{Display, Formatter};
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use tcommon::SessionId;
use uuid::Uuid;

use crate::ChatError;

/// Phase of one turn. `Errored` is reachable from the three middle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    Idle,
    Validating,
    AwaitingModel,
    Streaming,
    Finalizing,
    Errored,
}

impl Display for TurnState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::AwaitingModel => "awaiting_model",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Errored => "errored",
        })
    }
}

/// A message bubble as rendered by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_streaming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_user,
            timestamp: Utc::now(),
            is_streaming: None,
            suggestions: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// Empty bot bubble that chunks will fill in.
    pub fn streaming_placeholder() -> Self {
        let mut message = Self::bot(String::new());
        message.is_streaming = Some(true);
        message
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming.unwrap_or(false)
    }

    /// Replaces the text with the chunk's cumulative content.
    ///
    /// Returns `false` once the message has been finalized; later chunks are ignored.
    pub fn apply_chunk(&mut self, chunk: &StreamingChunk) -> bool {
        if !self.is_streaming() {
            return false;
        }

        self.text.clone_from(&chunk.content);
        if chunk.is_complete {
            self.is_streaming = Some(false);
            self.suggestions.clone_from(&chunk.suggestions);
        }
        true
    }
}

/// Cumulative text of a streaming reply; suggestions ride on the last chunk only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingChunk {
    pub content: String,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl StreamingChunk {
    pub fn partial(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_complete: false,
            suggestions: None,
        }
    }

    pub fn complete(content: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            content: content.into(),
            is_complete: true,
            suggestions: Some(suggestions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnRequest {
    pub session_id: SessionId,
    pub text: String,
    /// `None` follows the `enableStreaming` setting.
    pub stream: Option<bool>,
}

impl ChatTurnRequest {
    pub fn new(session_id: impl Into<SessionId>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            stream: None,
        }
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

/// How the bot reply of a finished turn was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered; the reply was appended to history.
    Replied,
    /// No credentials; the setup guidance was shown instead.
    NotConfigured,
    /// The model or a tool failed; the apology was shown instead.
    Failed(ChatError),
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replied => "replied",
            Self::NotConfigured => "not_configured",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub session_id: SessionId,
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
    pub outcome: TurnOutcome,
    /// Whether the bot message was delivered through chunks.
    pub streamed: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    UserMessage(ChatMessage),
    /// Streaming turns only: the placeholder the following chunks fill in.
    BotMessageStarted(ChatMessage),
    Chunk {
        message_id: String,
        chunk: StreamingChunk,
    },
    Finished(ChatTurnResult),
}

pub type ChatTurnStream<'a> = Pin<Box<dyn Stream<Item = Result<TurnEvent, ChatError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub idea: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub length: StoryLength,
}

impl StoryRequest {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            genre: None,
            length: StoryLength::default(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_length(mut self, length: StoryLength) -> Self {
        self.length = length;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub title: String,
    pub story: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moral: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_message_serializes_in_panel_shape() {
        let message = ChatMessage::bot("Xin chào").with_suggestions(vec!["Tạo nhân vật".into()]);
        let value = serde_json::to_value(&message).expect("message should serialize");

        assert_eq!(value["isUser"], json!(false));
        assert_eq!(value["text"], json!("Xin chào"));
        assert_eq!(value["suggestions"], json!(["Tạo nhân vật"]));
        assert!(value.get("isStreaming").is_none());
        assert!(Uuid::parse_str(&message.id).is_ok());
    }

    #[test]
    fn chunks_replace_text_until_finalized() {
        let mut message = ChatMessage::streaming_placeholder();

        assert!(message.apply_chunk(&StreamingChunk::partial("Ngày xửa")));
        assert_eq!(message.text, "Ngày xửa");
        assert!(message.apply_chunk(&StreamingChunk::complete(
            "Ngày xửa ngày xưa",
            vec!["Tạo thêm".into()]
        )));
        assert!(!message.is_streaming());
        assert_eq!(message.suggestions, Some(vec!["Tạo thêm".to_string()]));

        assert!(!message.apply_chunk(&StreamingChunk::partial("muộn")));
        assert_eq!(message.text, "Ngày xửa ngày xưa");
    }

    #[test]
    fn story_request_defaults_to_medium_length() {
        let request: StoryRequest =
            serde_json::from_value(json!({"idea": "Một chú mèo biết bay"})).expect("decode");
        assert_eq!(request.length, StoryLength::Medium);
        assert!(request.genre.is_none());
    }
}
