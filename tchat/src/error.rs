//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tconfig::ConfigError;
use tmemory::MemoryError;
use tprovider::{ProviderError, ProviderErrorKind};
use ttooling::ToolError;

use crate::TurnState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    EmptyMessage,
    MessageTooLong,
    /// No usable credentials, or the backend rejected them.
    ModelNotConfigured,
    ModelUnavailable,
    ToolExecution,
    StoryGeneration,
    SessionIo,
    /// Another turn for the same session has not finished yet.
    TurnInProgress,
}

/// Underlying failure preserved for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatErrorSource {
    Provider(ProviderError),
    Tool(ToolError),
    Memory(MemoryError),
    Config(ConfigError),
}

impl Display for ChatErrorSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(error) => write!(f, "{error}"),
            Self::Tool(error) => write!(f, "{error}"),
            Self::Memory(error) => write!(f, "{error}"),
            Self::Config(error) => write!(f, "{error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub phase: Option<TurnState>,
    pub source: Option<ChatErrorSource>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            source: None,
        }
    }

    pub fn empty_message(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::EmptyMessage, message)
    }

    pub fn message_too_long(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::MessageTooLong, message)
    }

    pub fn model_not_configured(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ModelNotConfigured, message)
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ModelUnavailable, message)
    }

    pub fn tool_execution(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ToolExecution, message)
    }

    pub fn story_generation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::StoryGeneration, message)
    }

    pub fn session_io(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::SessionIo, message)
    }

    pub fn turn_in_progress(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::TurnInProgress, message)
    }

    pub fn with_phase(mut self, phase: TurnState) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_source(mut self, source: ChatErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Validation failures are reported to the user as-is.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ChatErrorKind::EmptyMessage | ChatErrorKind::MessageTooLong
        )
    }

    /// Detail string for the host's `error` event.
    pub fn details(&self) -> Option<String> {
        self.source.as_ref().map(ToString::to_string)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{:?} [{}]: {}", self.kind, phase, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Authentication => ChatErrorKind::ModelNotConfigured,
            _ => ChatErrorKind::ModelUnavailable,
        };
        Self::new(kind, value.message.clone()).with_source(ChatErrorSource::Provider(value))
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        Self::tool_execution(value.message.clone()).with_source(ChatErrorSource::Tool(value))
    }
}

impl From<MemoryError> for ChatError {
    fn from(value: MemoryError) -> Self {
        Self::session_io(value.message.clone()).with_source(ChatErrorSource::Memory(value))
    }
}

impl From<ConfigError> for ChatError {
    fn from(value: ConfigError) -> Self {
        Self::model_not_configured(value.message.clone()).with_source(ChatErrorSource::Config(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_classify_by_kind() {
        let auth = ChatError::from(ProviderError::authentication("bad key"));
        assert_eq!(auth.kind, ChatErrorKind::ModelNotConfigured);

        let outage = ChatError::from(ProviderError::unavailable("overloaded"));
        assert_eq!(outage.kind, ChatErrorKind::ModelUnavailable);
        assert!(matches!(outage.source, Some(ChatErrorSource::Provider(_))));
    }

    #[test]
    fn display_includes_phase_when_known() {
        let error = ChatError::from(MemoryError::storage("disk full")).with_phase(TurnState::Finalizing);
        assert_eq!(error.to_string(), "SessionIo [finalizing]: disk full");
        assert_eq!(error.details().as_deref(), Some("Storage: disk full"));
    }

    #[test]
    fn only_input_errors_are_validation() {
        assert!(ChatError::empty_message("x").is_validation());
        assert!(ChatError::message_too_long("x").is_validation());
        assert!(!ChatError::turn_in_progress("x").is_validation());
    }
}
