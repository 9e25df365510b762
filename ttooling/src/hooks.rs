//! Lifecycle callbacks around story tool execution.
//!
//! ```rust
//! use ttooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! accepts_hooks(&NoopToolRuntimeHooks);
//! ```

use std::time::Duration;

use tprovider::ToolCall;

use crate::{ToolError, ToolExecutionContext, ToolKind};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _kind: ToolKind,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _elapsed: Duration,
    ) {
    }

    /// Unknown tool names and malformed arguments also land here.
    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
