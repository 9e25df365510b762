//! Tool trait contract for dispatch-table entries.

use tcommon::BoxFuture;
use tprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext, ToolKind};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn definition(&self) -> ToolDefinition;

    /// Runs the tool on JSON arguments and returns JSON output.
    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}
