//! Tracing and metrics behind one hook value.

use std::time::Duration;

use tchat::{ChatError, ChatTurnHooks, TurnOutcome, TurnState};
use tcommon::SessionId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolExecutionContext, ToolKind, ToolRuntimeHooks};

use crate::{MetricsObservabilityHooks, TracingObservabilityHooks};

/// Emits every callback to tracing and, when enabled, to metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilityHooks {
    tracing: TracingObservabilityHooks,
    metrics: Option<MetricsObservabilityHooks>,
}

impl ObservabilityHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled.then_some(MetricsObservabilityHooks);
        self
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }
}

impl ProviderOperationHooks for ObservabilityHooks {
    fn on_request_start(&self, provider: ProviderId, operation: &str, model: &str) {
        self.tracing.on_request_start(provider, operation, model);
        if let Some(metrics) = &self.metrics {
            metrics.on_request_start(provider, operation, model);
        }
    }

    fn on_success(&self, provider: ProviderId, operation: &str, elapsed: Duration) {
        self.tracing.on_success(provider, operation, elapsed);
        if let Some(metrics) = &self.metrics {
            metrics.on_success(provider, operation, elapsed);
        }
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        self.tracing.on_failure(provider, operation, elapsed, error);
        if let Some(metrics) = &self.metrics {
            metrics.on_failure(provider, operation, elapsed, error);
        }
    }

    fn on_structured_fallback(&self, provider: ProviderId, reason: &str) {
        self.tracing.on_structured_fallback(provider, reason);
        if let Some(metrics) = &self.metrics {
            metrics.on_structured_fallback(provider, reason);
        }
    }
}

impl ToolRuntimeHooks for ObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        self.tracing.on_execution_start(tool_call, context);
        if let Some(metrics) = &self.metrics {
            metrics.on_execution_start(tool_call, context);
        }
    }

    fn on_execution_success(
        &self,
        kind: ToolKind,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        self.tracing
            .on_execution_success(kind, tool_call, context, elapsed);
        if let Some(metrics) = &self.metrics {
            metrics.on_execution_success(kind, tool_call, context, elapsed);
        }
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        self.tracing
            .on_execution_failure(tool_call, context, error, elapsed);
        if let Some(metrics) = &self.metrics {
            metrics.on_execution_failure(tool_call, context, error, elapsed);
        }
    }
}

impl ChatTurnHooks for ObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, streaming: bool) {
        self.tracing.on_turn_start(session_id, streaming);
        if let Some(metrics) = &self.metrics {
            metrics.on_turn_start(session_id, streaming);
        }
    }

    fn on_state_change(&self, session_id: &SessionId, from: TurnState, to: TurnState) {
        self.tracing.on_state_change(session_id, from, to);
        if let Some(metrics) = &self.metrics {
            metrics.on_state_change(session_id, from, to);
        }
    }

    fn on_turn_rejected(&self, session_id: &SessionId, error: &ChatError) {
        self.tracing.on_turn_rejected(session_id, error);
        if let Some(metrics) = &self.metrics {
            metrics.on_turn_rejected(session_id, error);
        }
    }

    fn on_turn_complete(&self, session_id: &SessionId, outcome: &TurnOutcome, elapsed: Duration) {
        self.tracing.on_turn_complete(session_id, outcome, elapsed);
        if let Some(metrics) = &self.metrics {
            metrics.on_turn_complete(session_id, outcome, elapsed);
        }
    }

    fn on_reload(&self, ready: bool) {
        self.tracing.on_reload(ready);
        if let Some(metrics) = &self.metrics {
            metrics.on_reload(ready);
        }
    }
}
