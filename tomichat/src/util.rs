//! Small convenience constructors for common types.

use crate::{ChatTurnRequest, Message, SessionId, StoryLength, StoryRequest};

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn model_message(content: impl Into<String>) -> Message {
    Message::model(content)
}

/// Turn delivered as a single message.
pub fn turn(session_id: impl Into<SessionId>, text: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::new(session_id, text).with_streaming(false)
}

pub fn streaming_turn(session_id: impl Into<SessionId>, text: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::new(session_id, text).with_streaming(true)
}

pub fn parse_story_length(value: &str) -> Option<StoryLength> {
    match value.trim().to_lowercase().as_str() {
        "short" | "ngắn" => Some(StoryLength::Short),
        "medium" | "vừa" => Some(StoryLength::Medium),
        "long" | "dài" => Some(StoryLength::Long),
        _ => None,
    }
}

/// Story request with the genre left to the default when blank.
pub fn story(idea: impl Into<String>, genre: &str, length: StoryLength) -> StoryRequest {
    let request = StoryRequest::new(idea).with_length(length);
    match genre.trim() {
        "" => request,
        genre => request.with_genre(genre),
    }
}
