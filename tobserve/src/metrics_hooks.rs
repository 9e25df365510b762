//! Metrics-based observability hooks for model calls, tool runtime and chat turns.
//!
//! ```rust
//! use tobserve::MetricsObservabilityHooks;
//! use tprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use tchat::{ChatError, ChatTurnHooks, TurnOutcome, TurnState};
use tcommon::SessionId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolExecutionContext, ToolKind, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, provider: ProviderId, operation: &str, _model: &str) {
        metrics::counter!(
            "tomichat_provider_request_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_success(&self, provider: ProviderId, operation: &str, elapsed: Duration) {
        metrics::counter!(
            "tomichat_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "tomichat_provider_duration_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "tomichat_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "tomichat_provider_duration_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_structured_fallback(&self, provider: ProviderId, _reason: &str) {
        metrics::counter!(
            "tomichat_provider_structured_fallback_total",
            "provider" => provider.to_string()
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "tomichat_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        kind: ToolKind,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tomichat_tool_execution_success_total",
            "tool_name" => kind.name()
        )
        .increment(1);
        metrics::histogram!(
            "tomichat_tool_execution_duration_seconds",
            "tool_name" => kind.name(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tomichat_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tomichat_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatTurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _session_id: &SessionId, streaming: bool) {
        metrics::counter!(
            "tomichat_turn_start_total",
            "streaming" => streaming.to_string()
        )
        .increment(1);
    }

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, to: TurnState) {
        metrics::counter!("tomichat_turn_state_total", "state" => to.to_string()).increment(1);
    }

    fn on_turn_rejected(&self, _session_id: &SessionId, error: &ChatError) {
        metrics::counter!(
            "tomichat_turn_rejected_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _session_id: &SessionId, outcome: &TurnOutcome, elapsed: Duration) {
        metrics::counter!("tomichat_turn_complete_total", "outcome" => outcome.as_str())
            .increment(1);
        metrics::histogram!("tomichat_turn_duration_seconds", "outcome" => outcome.as_str())
            .record(elapsed.as_secs_f64());
    }

    fn on_reload(&self, ready: bool) {
        metrics::gauge!("tomichat_model_ready").set(if ready { 1.0 } else { 0.0 });
    }
}
