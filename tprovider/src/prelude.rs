//! Common `tprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, GenerationConfig, Message, ModelClient, ModelProvider, ModelRequest,
    ModelResponse, OutputItem, ProviderError, ProviderErrorKind, ProviderFactory, ProviderId,
    ProviderOperationHooks, Role, StopReason, StreamEvent, TokenUsage, ToolCall, ToolDefinition,
    ToolResult, ToolRound,
};
pub use tcommon::{BoxFuture, MetadataMap};
