//! The client, tools and tool runtime built from one settings value.
//!
//! A [`FlowSnapshot`] is immutable. Reloading builds a new snapshot and swaps
//! it in whole, so a turn sees either the old triple or the new one.

use std::sync::Arc;

use tconfig::ChatSettings;
use tprovider::{
    GenerationConfig, ModelClient, NoopOperationHooks, ProviderFactory, ProviderOperationHooks,
};
use ttooling::{DefaultToolRuntime, NoopToolRuntimeHooks, ToolRegistry, ToolRuntime, ToolRuntimeHooks};

use crate::prompts::SYSTEM_PROMPT;

/// Model access for a configured snapshot.
#[derive(Clone)]
pub struct ModelBackend {
    /// Chat client with the assistant system prompt bound.
    pub chat: ModelClient,
    /// Prompt-only client used by story generation and the tools.
    pub plain: ModelClient,
    pub tools: Arc<ToolRegistry>,
    pub runtime: Arc<dyn ToolRuntime>,
}

pub struct FlowSnapshot {
    pub settings: ChatSettings,
    backend: Option<ModelBackend>,
}

impl FlowSnapshot {
    pub fn unconfigured(settings: ChatSettings) -> Self {
        Self {
            settings,
            backend: None,
        }
    }

    pub fn backend(&self) -> Option<&ModelBackend> {
        self.backend.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }
}

/// Observers wired into every client and runtime a [`FlowBuilder`] creates.
#[derive(Clone)]
pub struct FlowBuilder {
    factory: Arc<dyn ProviderFactory>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

impl FlowBuilder {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            provider_hooks: Arc::new(NoopOperationHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = hooks;
        self
    }

    pub fn with_tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    /// Builds the snapshot for `settings`; without a usable key the snapshot is unconfigured.
    pub fn build(&self, settings: ChatSettings) -> FlowSnapshot {
        if !settings.is_configured() {
            tracing::info!("no API key configured; chat will answer with setup guidance");
            return FlowSnapshot::unconfigured(settings);
        }

        let provider = match self.factory.build(&settings) {
            Ok(provider) => provider,
            Err(error) => {
                tracing::warn!(kind = ?error.kind, error = %error.message, "model provider could not be built");
                return FlowSnapshot::unconfigured(settings);
            }
        };

        let config = GenerationConfig::from_settings(&settings);
        let chat = ModelClient::new(
            Arc::clone(&provider),
            config.clone().with_system_prompt(SYSTEM_PROMPT),
        )
        .with_hooks(Arc::clone(&self.provider_hooks));
        let plain =
            ModelClient::new(provider, config).with_hooks(Arc::clone(&self.provider_hooks));

        let tools = Arc::new(ToolRegistry::story_tools(plain.clone()));
        let runtime = Arc::new(
            DefaultToolRuntime::new(Arc::clone(&tools)).with_hooks(Arc::clone(&self.tool_hooks)),
        );

        tracing::info!(model = %settings.model, tools = tools.len(), "chat flows ready");
        FlowSnapshot {
            settings,
            backend: Some(ModelBackend {
                chat,
                plain,
                tools,
                runtime,
            }),
        }
    }
}
