//! Lifecycle callbacks around chat turns.

use std::time::Duration;

use tcommon::SessionId;

use crate::{ChatError, TurnOutcome, TurnState};

pub trait ChatTurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _streaming: bool) {}

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, _to: TurnState) {}

    /// Validation failures and concurrent submissions; no turn was started.
    fn on_turn_rejected(&self, _session_id: &SessionId, _error: &ChatError) {}

    fn on_turn_complete(&self, _session_id: &SessionId, _outcome: &TurnOutcome, _elapsed: Duration) {}

    fn on_reload(&self, _ready: bool) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatTurnHooks;

impl ChatTurnHooks for NoopChatTurnHooks {}
