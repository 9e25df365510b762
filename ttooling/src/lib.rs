//! Story tools the model may call while generating a reply.
//!
//! The set is closed: [`ToolKind`] names every tool and [`ToolRegistry`] maps
//! each kind to its implementation. [`DefaultToolRuntime`] resolves the
//! model's calls against the registry.
//!
//! ```rust
//! use ttooling::{ToolKind, ToolRegistry};
//!
//! let registry = ToolRegistry::new();
//! assert!(registry.resolve(ToolKind::CreateCharacter.name()).is_none());
//! assert!(registry.definitions().is_empty());
//! ```

mod args;
mod error;
mod hooks;
mod kind;
mod registry;
mod runtime;
pub mod story;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolFuture, ToolKind, ToolRegistry, ToolRuntime,
    };
}

pub use args::parse_arguments;
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use kind::ToolKind;
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
