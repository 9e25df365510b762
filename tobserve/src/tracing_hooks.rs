//! Tracing-based observability hooks for model calls, tool runtime and chat turns.
//!
//! ```rust
//! use tchat::ChatTurnHooks;
//! use tobserve::TracingObservabilityHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn ChatTurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use tchat::{ChatError, ChatTurnHooks, TurnOutcome, TurnState};
use tcommon::SessionId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolExecutionContext, ToolKind, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_request_start(&self, provider: ProviderId, operation: &str, model: &str) {
        tracing::info!(
            phase = "provider",
            event = "request_start",
            provider = %provider,
            operation,
            model
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, elapsed: Duration) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_structured_fallback(&self, provider: ProviderId, reason: &str) {
        tracing::warn!(
            phase = "provider",
            event = "structured_fallback",
            provider = %provider,
            reason
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            session_id = %context.session_id
        );
    }

    fn on_execution_success(
        &self,
        kind: ToolKind,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool = %kind,
            tool_call_id = %tool_call.id,
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ChatTurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, streaming: bool) {
        tracing::info!(
            phase = "turn",
            event = "start",
            session_id = %session_id,
            streaming
        );
    }

    fn on_state_change(&self, session_id: &SessionId, from: TurnState, to: TurnState) {
        tracing::debug!(
            phase = "turn",
            event = "state_change",
            session_id = %session_id,
            from = %from,
            to = %to
        );
    }

    fn on_turn_rejected(&self, session_id: &SessionId, error: &ChatError) {
        tracing::warn!(
            phase = "turn",
            event = "rejected",
            session_id = %session_id,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, outcome: &TurnOutcome, elapsed: Duration) {
        match outcome {
            TurnOutcome::Failed(error) => tracing::error!(
                phase = "turn",
                event = "complete",
                session_id = %session_id,
                outcome = outcome.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error = %error
            ),
            _ => tracing::info!(
                phase = "turn",
                event = "complete",
                session_id = %session_id,
                outcome = outcome.as_str(),
                elapsed_ms = elapsed.as_millis() as u64
            ),
        }
    }

    fn on_reload(&self, ready: bool) {
        tracing::info!(phase = "turn", event = "reload", ready);
    }
}
