use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tchat::{ChatError, ChatTurnHooks, TurnOutcome, TurnState};
use tcommon::SessionId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolExecutionContext, ToolKind, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_request_start(&self, provider: ProviderId, operation: &str, model: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(provider, operation, model)
        }));
    }

    fn on_success(&self, provider: ProviderId, operation: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, elapsed)
        }));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, elapsed, error)
        }));
    }

    fn on_structured_fallback(&self, provider: ProviderId, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_structured_fallback(provider, reason)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        kind: ToolKind,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(kind, tool_call, context, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeChatTurnHooks<H> {
    inner: H,
}

impl<H> SafeChatTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatTurnHooks for SafeChatTurnHooks<H>
where
    H: ChatTurnHooks,
{
    fn on_turn_start(&self, session_id: &SessionId, streaming: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(session_id, streaming)
        }));
    }

    fn on_state_change(&self, session_id: &SessionId, from: TurnState, to: TurnState) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_state_change(session_id, from, to)
        }));
    }

    fn on_turn_rejected(&self, session_id: &SessionId, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_rejected(session_id, error)
        }));
    }

    fn on_turn_complete(&self, session_id: &SessionId, outcome: &TurnOutcome, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(session_id, outcome, elapsed)
        }));
    }

    fn on_reload(&self, ready: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_reload(ready)));
    }
}
