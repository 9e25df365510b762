//! Observability hooks for model calls, story tools and chat turns.
//!
//! ```rust
//! use tobserve::{MetricsObservabilityHooks, SafeProviderHooks, TracingObservabilityHooks};
//!
//! let _provider_hooks = SafeProviderHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod fanout;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout::ObservabilityHooks;
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeChatTurnHooks, SafeProviderHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, ObservabilityHooks, SafeChatTurnHooks, SafeProviderHooks,
        SafeToolHooks, TracingObservabilityHooks,
    };
}
