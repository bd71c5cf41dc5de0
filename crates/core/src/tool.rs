//! The Tool trait and the registry the agent loop dispatches through.
//!
//! Tools are what give the agent the ability to act in the world:
//! read and write workspace files, run code, render charts. The registry is
//! the single source of truth for what the agent may do. It renders the
//! capability listing injected into the system prompt, validates incoming
//! actions and dispatches them.
//!
//! Dispatch never fails: validation errors, tool errors and panics all come
//! back as a failed [`ToolResult`] so the model can see what went wrong and
//! try again.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::action::Arguments;
use crate::error::{RegistryError, ToolError, ValidationError};

/// Name of the terminal tool whose invocation ends a run.
pub const FINAL_ANSWER: &str = "final_answer";

/// Version stamped on the capability listing header.
pub const LISTING_VERSION: &str = "1.0.0";

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Human-readable purpose, shown to the model
    pub description: String,
}

/// Static description of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique key in a registry
    pub name: String,

    /// What the tool does (sent to the LLM)
    pub description: String,

    /// Required parameter names, in declaration order
    pub required_params: Vec<String>,

    /// Every parameter with its purpose, in declaration order
    pub all_params: Vec<Parameter>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required_params: Vec::new(),
            all_params: Vec::new(),
        }
    }

    /// Declare a required parameter.
    pub fn required(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        self.required_params.push(name.clone());
        self.all_params.push(Parameter {
            name,
            description: description.into(),
        });
        self
    }

    /// Declare an optional parameter.
    pub fn optional(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.all_params.push(Parameter {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn is_required(&self, param: &str) -> bool {
        self.required_params.iter().any(|p| p == param)
    }

    fn purpose(&self, param: &str) -> Option<&str> {
        self.all_params
            .iter()
            .find(|p| p.name == param)
            .map(|p| p.description.as_str())
    }

    /// Parameters that are declared but not required, in declaration order.
    pub fn optional_params(&self) -> impl Iterator<Item = &Parameter> {
        self.all_params.iter().filter(|p| !self.is_required(&p.name))
    }

    /// Check the definition is complete enough to register.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let incomplete = |reason: String| RegistryError::IncompleteDefinition {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(incomplete("name is empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(incomplete("description is empty".into()));
        }
        for param in &self.required_params {
            if self.purpose(param).is_none() {
                return Err(incomplete(format!(
                    "required parameter '{param}' is not declared"
                )));
            }
        }
        Ok(())
    }

    /// The listing block for this tool.
    fn render(&self) -> String {
        let mut lines = vec![format!("- **{}**: {}", self.name, self.description)];

        if !self.required_params.is_empty() {
            lines.push("  Required parameters:".to_string());
            for param in &self.required_params {
                let purpose = self.purpose(param).unwrap_or_default();
                lines.push(format!("    - {param}: {purpose}"));
            }
        }

        let optional: Vec<_> = self.optional_params().collect();
        if !optional.is_empty() {
            lines.push("  Optional parameters:".to_string());
            for param in optional {
                lines.push(format!("    - {}: {}", param.name, param.description));
            }
        }

        lines.join("\n")
    }
}

/// The outcome of a dispatched tool call, folded into memory as an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The core Tool trait.
///
/// Each tool (read_file, write_file, execute_code, ...) implements this trait
/// and is registered in a [`ToolRegistry`]. `execute` is only called with
/// arguments that passed validation against `definition()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The static description of this tool.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: &Arguments) -> std::result::Result<String, ToolError>;
}

struct Entry {
    definition: ToolDefinition,
    tool: Box<dyn Tool>,
}

/// A registry of available tools.
///
/// Built once, then shared read-only (typically behind an `Arc`).
/// Iteration follows registration order so the capability listing is stable.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        let definition = tool.definition();
        definition.validate()?;
        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateTool(definition.name));
        }

        tracing::debug!(tool = %definition.name, "Registered tool");
        self.index.insert(definition.name.clone(), self.entries.len());
        self.entries.push(Entry { definition, tool });
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.entry(name).map(|e| e.tool.as_ref())
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.entry(name).map(|e| &e.definition)
    }

    /// All tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.definition.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Render the capability listing injected into the system prompt.
    pub fn describe(&self) -> String {
        let header = format!("# Available tools (version: {LISTING_VERSION})\n");
        let blocks: Vec<String> = self.entries.iter().map(|e| e.definition.render()).collect();
        header + &blocks.join("\n\n")
    }

    /// Check that `name` is registered and every required parameter is present.
    pub fn validate_arguments(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<(), ValidationError> {
        let definition = self
            .definition(name)
            .ok_or_else(|| ValidationError::UnknownTool(name.to_string()))?;

        match definition
            .required_params
            .iter()
            .find(|p| !arguments.contains_key(p.as_str()))
        {
            Some(missing) => Err(ValidationError::MissingParameter {
                tool_name: name.to_string(),
                parameter: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Validate, then execute a tool call.
    pub async fn dispatch(&self, name: &str, arguments: &Arguments) -> ToolResult {
        if let Err(e) = self.validate_arguments(name, arguments) {
            tracing::warn!(tool = %name, error = %e, "Rejected tool call");
            return ToolResult::failure(format!("Argument validation failed: {e}"));
        }
        let Some(tool) = self.get(name) else {
            return ToolResult::failure(format!("Argument validation failed: Unknown tool: {name}"));
        };

        let started = std::time::Instant::now();
        let outcome = AssertUnwindSafe(tool.execute(arguments)).catch_unwind().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(output)) => {
                tracing::info!(tool = %name, elapsed_ms, "Tool executed");
                ToolResult::ok(output)
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = %name, elapsed_ms, error = %e, "Tool failed");
                ToolResult::failure(format!("Tool execution error [{name}]: {e}"))
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool panicked".to_string());
                tracing::error!(tool = %name, elapsed_ms, reason = %reason, "Tool panicked");
                ToolResult::failure(format!("Tool execution error [{name}]: {reason}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes `text`, counting how often it actually ran.
    struct EchoTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("echo", "Echoes back the input")
                .required("text", "Text to echo")
                .optional("suffix", "Appended to the output")
        }

        async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = arguments["text"].as_str().unwrap_or("");
            let suffix = arguments.get("suffix").and_then(|v| v.as_str()).unwrap_or("");
            Ok(format!("{text}{suffix}"))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("fail", "Always fails")
        }

        async fn execute(&self, _arguments: &Arguments) -> Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "fail".into(),
                reason: "boom".into(),
            })
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("panic", "Always panics")
        }

        async fn execute(&self, _arguments: &Arguments) -> Result<String, ToolError> {
            panic!("kaboom")
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            let mut def = ToolDefinition::new("broken", "Declares an unknown required param");
            def.required_params.push("ghost".into());
            def
        }

        async fn execute(&self, _arguments: &Arguments) -> Result<String, ToolError> {
            Ok(String::new())
        }
    }

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn echo_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(EchoTool { calls: calls.clone() }))
            .unwrap();
        (registry, calls)
    }

    #[test]
    fn registry_register_and_lookup() {
        let (registry, _) = echo_registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let (mut registry, calls) = echo_registry();
        let err = registry.register(Box::new(EchoTool { calls })).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn incomplete_definition_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry.register(Box::new(BrokenTool)).unwrap_err();
        assert!(matches!(err, RegistryError::IncompleteDefinition { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_description_is_incomplete() {
        let def = ToolDefinition::new("x", "  ");
        assert!(def.validate().is_err());
    }

    #[test]
    fn describe_lists_required_and_optional() {
        let (mut registry, _) = echo_registry();
        registry.register(Box::new(FailingTool)).unwrap();

        let listing = registry.describe();
        assert!(listing.starts_with("# Available tools (version: 1.0.0)\n"));
        assert!(listing.contains(
            "- **echo**: Echoes back the input\n  Required parameters:\n    - text: Text to echo\n  Optional parameters:\n    - suffix: Appended to the output"
        ));
        // registration order
        let echo = listing.find("**echo**").unwrap();
        let fail = listing.find("**fail**").unwrap();
        assert!(echo < fail);
    }

    #[test]
    fn describe_is_stable() {
        let (registry, _) = echo_registry();
        assert_eq!(registry.describe(), registry.describe());
    }

    #[test]
    fn validate_reports_first_missing_parameter() {
        let calls = Arc::new(AtomicUsize::new(0));
        struct Two(Arc<AtomicUsize>);
        #[async_trait]
        impl Tool for Two {
            fn definition(&self) -> ToolDefinition {
                ToolDefinition::new("two", "Needs two")
                    .required("a", "first")
                    .required("b", "second")
            }
            async fn execute(&self, _: &Arguments) -> Result<String, ToolError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(String::new())
            }
        }
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Two(calls))).unwrap();

        let err = registry.validate_arguments("two", &Arguments::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingParameter {
                tool_name: "two".into(),
                parameter: "a".into()
            }
        );
        let err = registry
            .validate_arguments("two", &args(json!({"a": 1})))
            .unwrap_err();
        assert!(err.to_string().contains("b"));
    }

    #[tokio::test]
    async fn dispatch_executes_tool() {
        let (registry, calls) = echo_registry();
        let result = registry
            .dispatch("echo", &args(json!({"text": "hello", "suffix": "!"})))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "hello!");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_does_not_invoke_anything() {
        let (registry, calls) = echo_registry();
        let result = registry.dispatch("nonexistent", &Arguments::new()).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Argument validation failed"));
        assert!(result.output.contains("nonexistent"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_parameter_does_not_invoke_tool() {
        let (registry, calls) = echo_registry();
        let result = registry.dispatch("echo", &args(json!({"suffix": "!"}))).await;
        assert!(!result.success);
        assert_eq!(
            result.output,
            "Argument validation failed: Missing required parameter: text"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_error_becomes_failed_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FailingTool)).unwrap();
        let result = registry.dispatch("fail", &Arguments::new()).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Tool execution error [fail]:"));
        assert!(result.output.contains("boom"));
    }

    #[tokio::test]
    async fn tool_panic_becomes_failed_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(PanickingTool)).unwrap();
        let result = registry.dispatch("panic", &Arguments::new()).await;
        assert!(!result.success);
        assert_eq!(result.output, "Tool execution error [panic]: kaboom");
    }
}
