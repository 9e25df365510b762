//! Model access for the chat coordinator and story tools.
//!
//! [`ModelProvider`] is the backend seam; [`ModelClient`] binds a provider to a
//! [`GenerationConfig`] and is what the rest of the workspace calls. The Gemini
//! REST adapter lives under [`adapters::gemini`] behind the `provider-gemini`
//! feature.
//!
//! ```rust
//! use tprovider::{GenerationConfig, Message, ModelRequest};
//!
//! let config = GenerationConfig::new("gemini-2.0-flash").with_system_prompt("Bạn là TomiChat");
//! let request = ModelRequest::builder(config.model.clone())
//!     .options(config.options())
//!     .message(Message::user("Kể cho tôi một câu chuyện"))
//!     .build()
//!     .expect("request should be valid");
//!
//! assert_eq!(request.options.top_k, Some(40));
//! ```

pub mod adapters;
mod client;
mod error;
mod hooks;
mod model;
pub mod prelude;
mod provider;
mod stream;

pub use client::{
    DEFAULT_TOP_K, DEFAULT_TOP_P, GenerationConfig, ModelClient, parse_structured_output,
};
pub use error::{ProviderError, ProviderErrorKind};
pub use hooks::{NoopOperationHooks, ProviderOperationHooks};
pub use model::{
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, ProviderId, Role,
    StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResult, ToolRound,
};
pub use provider::{ModelProvider, ProviderFactory, ProviderFuture};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
