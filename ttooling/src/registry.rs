//! Dispatch table from [`ToolKind`] to its implementation.

use std::sync::Arc;

use tcommon::Registry;
use tprovider::{ModelClient, ToolDefinition};

use crate::story::{AnalyzeStory, CreateCharacter, CreatePlotTwist, CreateSetting, StoryTool};
use crate::{Tool, ToolKind};

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Registry<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four story tools, all generating through `client`.
    ///
    /// Rebuilt whenever the client is, so tools never outlive the settings they
    /// were created with.
    pub fn story_tools(client: ModelClient) -> Self {
        let mut registry = Self::new();
        registry.register(StoryTool::<CreateCharacter>::new(client.clone()));
        registry.register(StoryTool::<CreateSetting>::new(client.clone()));
        registry.register(StoryTool::<CreatePlotTwist>::new(client.clone()));
        registry.register(StoryTool::<AnalyzeStory>::new(client));
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.kind(), Arc::new(tool));
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    /// Looks a tool up by the name the model used.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        ToolKind::from_name(name).and_then(|kind| self.get(kind))
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Declarations in [`ToolKind::ALL`] order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL
            .into_iter()
            .filter_map(|kind| self.tools.get(&kind))
            .map(|tool| tool.definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
