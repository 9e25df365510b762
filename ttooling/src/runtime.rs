//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::Instant;

use tprovider::{ToolCall, ToolDefinition};

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            let started = Instant::now();
            self.hooks.on_execution_start(&tool_call, &context);

            let outcome = match self.registry.resolve(&tool_call.name) {
                Some(tool) => tool
                    .invoke(&tool_call.arguments, &context)
                    .await
                    .map(|output| (tool.kind(), output)),
                None => Err(ToolError::not_found(format!(
                    "tool '{}' is not registered",
                    tool_call.name
                ))),
            };

            match outcome {
                Ok((kind, output)) => {
                    self.hooks
                        .on_execution_success(kind, &tool_call, &context, started.elapsed());
                    Ok(ToolExecutionResult::from_call(&tool_call, output))
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    tracing::warn!(
                        tool = %tool_call.name,
                        session_id = %context.session_id,
                        kind = ?error.kind,
                        error = %error.message,
                        "tool execution failed"
                    );
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::json;
    use tprovider::{ToolCall, ToolDefinition};

    use super::*;
    use crate::{Tool, ToolErrorKind, ToolKind};

    struct EchoCritic;

    impl Tool for EchoCritic {
        fn kind(&self) -> ToolKind {
            ToolKind::AnalyzeStory
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: ToolKind::AnalyzeStory.name().to_string(),
                description: "Echoes the session".to_string(),
                input_schema: json!({"type": "object"}),
            }
        }

        fn invoke<'a>(
            &'a self,
            args_json: &'a str,
            context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move {
                Ok(json!({"session": context.session_id.as_str(), "args": args_json}).to_string())
            })
        }
    }

    struct BrokenSetting;

    impl Tool for BrokenSetting {
        fn kind(&self) -> ToolKind {
            ToolKind::CreateSetting
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: ToolKind::CreateSetting.name().to_string(),
                description: "Always fails".to_string(),
                input_schema: json!({"type": "object"}),
            }
        }

        fn invoke<'a>(
            &'a self,
            _args_json: &'a str,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move { Err(ToolError::execution("Không thể tạo bối cảnh")) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_success(
            &self,
            kind: ToolKind,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("ok:{kind}:{}", tool_call.id));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("err:{}:{:?}", tool_call.name, error.kind));
        }
    }

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: "{}".to_string(),
        }
    }

    fn runtime(hooks: Arc<RecordingHooks>) -> DefaultToolRuntime {
        let mut registry = ToolRegistry::new();
        registry.register(EchoCritic);
        registry.register(BrokenSetting);
        DefaultToolRuntime::new(Arc::new(registry)).with_hooks(hooks)
    }

    #[tokio::test]
    async fn runtime_dispatches_by_tool_name() {
        let hooks = Arc::new(RecordingHooks::default());
        let result = runtime(hooks.clone())
            .execute(call("call_0", "analyzeStory"), ToolExecutionContext::new("session-1"))
            .await
            .expect("execution should succeed");

        assert_eq!(result.tool_call_id, "call_0");
        assert_eq!(result.tool_name, "analyzeStory");
        assert!(result.output.contains("session-1"));
        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["ok:analyzeStory:call_0".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let hooks = Arc::new(RecordingHooks::default());
        let error = runtime(hooks.clone())
            .execute(call("call_1", "deleteEverything"), ToolExecutionContext::new("s"))
            .await
            .expect_err("unknown tool should fail");

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["err:deleteEverything:NotFound".to_string()]
        );
    }

    #[tokio::test]
    async fn tool_failure_propagates_with_context() {
        let error = runtime(Arc::new(RecordingHooks::default()))
            .execute(call("call_2", "createSetting"), ToolExecutionContext::new("s"))
            .await
            .expect_err("broken tool should fail");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.tool_name.as_deref(), Some("createSetting"));
    }

    #[test]
    fn definitions_follow_declaration_order() {
        let runtime = runtime(Arc::new(RecordingHooks::default()));
        let names = runtime
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["createSetting", "analyzeStory"]);
    }
}
