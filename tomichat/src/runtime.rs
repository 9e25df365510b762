//! Runtime wiring: settings, session store, provider and observability in one bundle.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tobserve::{ObservabilityHooks, SafeChatTurnHooks, SafeProviderHooks, SafeToolHooks};

use crate::{
    ChannelEventSink, ChatCoordinator, ChatError, ChatPanel, ChatPolicy, ChatSettings, HostEvent,
    ProviderFactory, SessionId, SessionManager, SessionStoreConfig, create_session_store,
    generate_session_id,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    /// Also record `tomichat_*` metrics next to the tracing events.
    pub metrics: bool,
    pub policy: ChatPolicy,
}

impl RuntimeOptions {
    pub fn with_metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[derive(Clone)]
pub struct TomiChatRuntime {
    pub sessions: Arc<SessionManager>,
    pub coordinator: Arc<ChatCoordinator>,
}

impl TomiChatRuntime {
    pub fn settings(&self) -> ChatSettings {
        self.coordinator.settings()
    }

    /// Rebuilds the model client and tools. The session store is not reopened.
    pub fn reload(&self, settings: ChatSettings) -> Result<bool, ChatError> {
        self.coordinator.reload(settings)
    }

    pub fn panel(&self, session_id: impl Into<SessionId>, sink: ChannelEventSink) -> ChatPanel {
        ChatPanel::new(Arc::clone(&self.coordinator), session_id, Arc::new(sink))
    }

    /// Panel on a fresh session, with the receiving end of its event channel.
    pub fn open_panel(&self) -> (ChatPanel, UnboundedReceiver<HostEvent>) {
        let (sink, receiver) = ChannelEventSink::new();
        (self.panel(generate_session_id(), sink), receiver)
    }

    pub fn shutdown(&self) {
        self.coordinator.teardown();
    }
}

/// Runtime backed by Gemini for already-resolved settings.
#[cfg(feature = "provider-gemini")]
pub fn build_runtime(settings: ChatSettings) -> Result<TomiChatRuntime, ChatError> {
    build_runtime_with(
        settings,
        Arc::new(tprovider::adapters::gemini::GeminiProviderFactory::new()),
        RuntimeOptions::default(),
    )
}

/// Resolves settings from the environment, then builds a Gemini runtime.
#[cfg(feature = "provider-gemini")]
pub fn build_runtime_from_env() -> Result<TomiChatRuntime, ChatError> {
    let settings = crate::SettingsLoader::new().load()?;
    build_runtime(settings)
}

pub fn build_runtime_with(
    settings: ChatSettings,
    factory: Arc<dyn ProviderFactory>,
    options: RuntimeOptions,
) -> Result<TomiChatRuntime, ChatError> {
    let store = create_session_store(SessionStoreConfig::from_root(settings.session_root.clone()))?;
    let sessions = Arc::new(SessionManager::new(store));
    let hooks = ObservabilityHooks::new().with_metrics(options.metrics);

    let coordinator = ChatCoordinator::builder(factory)
        .with_settings(settings)
        .with_sessions(Arc::clone(&sessions))
        .with_policy(options.policy)
        .with_hooks(Arc::new(SafeChatTurnHooks::new(hooks)))
        .with_provider_hooks(Arc::new(SafeProviderHooks::new(hooks)))
        .with_tool_hooks(Arc::new(SafeToolHooks::new(hooks)))
        .build()?;

    tracing::info!(
        ready = coordinator.is_ready(),
        metrics = options.metrics,
        "tomichat runtime ready"
    );

    Ok(TomiChatRuntime {
        sessions,
        coordinator: Arc::new(coordinator),
    })
}
