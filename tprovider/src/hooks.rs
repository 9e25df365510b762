//! Operational hook contract for model calls.

use std::time::Duration;

use crate::{ProviderError, ProviderId};

/// Observes model calls made through [`crate::ModelClient`].
///
/// `operation` is `"complete"` or `"stream"`.
pub trait ProviderOperationHooks: Send + Sync {
    fn on_request_start(&self, _provider: ProviderId, _operation: &str, _model: &str) {}

    fn on_success(&self, _provider: ProviderId, _operation: &str, _elapsed: Duration) {}

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _elapsed: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_structured_fallback(&self, _provider: ProviderId, _reason: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}
